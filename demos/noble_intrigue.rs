/// Noble Intrigue example — a scripted noble's life through the shipped arcs.
///
/// A noble of 30 with a full treasury lives twenty years. Choices are
/// scripted, so the same seed always tells the same story.
///
/// Run with: cargo run --example noble_intrigue

use arc_engine::core::driver::run_year;
use arc_engine::core::manager::ArcManager;
use arc_engine::core::presenter::ScriptedPresenter;
use arc_engine::schema::character::Character;
use arc_engine::schema::npc::{NpcId, NpcProfile};
use arc_engine::schema::role::{Gender, Role};

fn main() {
    let mut manager = ArcManager::builder()
        .seed(1418)
        .catalog_path("content/arcs.ron")
        .config_path("content/engine.ron")
        .build()
        .expect("Failed to build arc manager");

    // --- Lady Cecily, a wealthy noble at court ---
    let mut cecily = Character::new("Cecily", Gender::Female, Role::Noble, 30);
    cecily.wealth = 800;

    // Investigate first, then always take the second option.
    let mut presenter = ScriptedPresenter::new([0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);

    // A married knight she meets at a feast in the first year
    let sir_walter = NpcProfile {
        id: NpcId(1),
        name: "Sir Walter".to_string(),
        role: Role::Knight,
        gender: Gender::Male,
        married: true,
    };
    if let Some(surfaced) = manager.start_from_encounter(&cecily, &sir_walter) {
        println!(
            "At the feast, {} draws Cecily into '{}'.",
            sir_walter.name, surfaced.arc_id
        );
    }

    for year in 1..=20 {
        cecily.age += 1;
        match run_year(&mut manager, &mut cecily, &mut presenter).expect("Year failed") {
            Some(report) => println!(
                "Year {:>2}: {} stage {} (choice {:?}){}",
                year,
                report.arc_id,
                report.stage,
                report.choice,
                if report.completed { " - completed" } else { "" }
            ),
            None => println!("Year {:>2}: quiet", year),
        }
    }

    println!("\n--- Transcript ---");
    for (title, body) in &presenter.transcript {
        println!("[{}] {}", title, body);
    }

    println!("\n--- Cecily at {} ---", cecily.age);
    println!("Health {}, wealth {}", cecily.health, cecily.wealth);
    println!("Completed arcs: {:?}", cecily.completed_arcs);
    for npc in manager.bound_npcs("adultery") {
        println!("Still entangled with {}", npc);
    }
}
