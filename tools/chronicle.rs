/// Chronicle — play a character's life year by year through the arc engine.
///
/// Usage: chronicle [--catalog <path>] [--config <path>] [--seed <n>]
///                  [--name <name>] [--role <role>] [--gender <gender>]
///                  [--age <n>] [--years <n>] [--auto] [--encounters]
///                  [--load <save.ron>] [--save <save.ron>]
///
/// Interactive by default: each surfaced event is printed and a choice is
/// read from stdin. `--auto` picks choices at random instead.
/// Set RUST_LOG (e.g. `RUST_LOG=arc_engine=debug`) to watch scheduling.
use arc_engine::core::driver::run_year;
use arc_engine::core::manager::ArcManager;
use arc_engine::core::presenter::Presenter;
use arc_engine::core::save::ArcManagerState;
use arc_engine::schema::character::Character;
use arc_engine::schema::npc::{NpcId, NpcProfile};
use arc_engine::schema::role::{Gender, Role};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const NPC_NAMES: [&str; 8] = [
    "Aldric", "Beatrix", "Cedric", "Edith", "Godfrey", "Isolde", "Osbert", "Rowena",
];

/// Reads choices from stdin and prints events to stdout.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn display(&mut self, title: &str, body: &str) {
        println!("\n== {} ==", title);
        println!("{}", body);
    }

    fn choose(&mut self, prompt: &str, options: &[&str]) -> usize {
        println!("\n{}", prompt);
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let stdin = io::stdin();
        loop {
            print!("choice> ");
            io::stdout().flush().ok();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
                // stdin closed: settle on the first option
                return 0;
            }
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
                _ => println!("Enter a number between 1 and {}.", options.len()),
            }
        }
    }
}

/// Picks uniformly at random and echoes the pick.
struct AutoPresenter {
    rng: StdRng,
}

impl Presenter for AutoPresenter {
    fn display(&mut self, title: &str, body: &str) {
        println!("\n== {} ==", title);
        println!("{}", body);
    }

    fn choose(&mut self, _prompt: &str, options: &[&str]) -> usize {
        let index = self.rng.gen_range(0..options.len().max(1));
        if let Some(option) = options.get(index) {
            println!("  -> {}", option);
        }
        index
    }
}

struct Options {
    catalog: PathBuf,
    config: Option<PathBuf>,
    seed: u64,
    name: String,
    role: Role,
    gender: Gender,
    age: u32,
    years: u32,
    auto: bool,
    encounters: bool,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "arc_engine=info".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let options = parse_args();

    let mut builder = ArcManager::builder()
        .seed(options.seed)
        .catalog_path(&options.catalog);
    if let Some(ref path) = options.config {
        builder = builder.config_path(path);
    }
    let mut manager = match builder.build() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    if let Some(ref path) = options.load {
        let restored = ArcManagerState::load_from_path(path).and_then(|s| manager.restore(s));
        if let Err(e) = restored {
            eprintln!("ERROR: could not load {}: {}", path.display(), e);
            process::exit(1);
        }
        println!("Resumed from {}", path.display());
    }

    let mut character = Character::new(&options.name, options.gender, options.role, options.age);
    println!(
        "{} the {} {} begins their chronicle at age {} ({} arcs known, seed {}).",
        character.name,
        character.gender,
        character.role,
        character.age,
        manager.catalog().len(),
        options.seed
    );
    println!(
        "As a {} you may: {}.",
        character.role,
        character.role.capabilities().actions.join(", ")
    );

    let mut presenter: Box<dyn Presenter> = if options.auto {
        Box::new(AutoPresenter {
            rng: StdRng::seed_from_u64(options.seed.wrapping_add(1)),
        })
    } else {
        Box::new(ConsolePresenter)
    };
    let mut world_rng = StdRng::seed_from_u64(options.seed.wrapping_add(2));

    for year in 1..=options.years {
        if !character.is_alive() {
            println!("\n{} has died.", character.name);
            break;
        }
        character.age += 1;
        println!("\n--- Year {} (age {}) ---", year, character.age);

        if options.encounters {
            let npc = random_npc(&mut world_rng, u64::from(year));
            println!("You spend an evening talking with {}, a {}.", npc.name, npc.role);
            if let Some(surfaced) = manager.start_from_encounter(&character, &npc) {
                println!("As you talk, the conversation takes an interesting turn...");
                match surfaced.event.execute(&mut character, presenter.as_mut(), manager.rng_mut()) {
                    Ok(choice) => {
                        if let Err(e) = manager.resolve_outcome(&surfaced.arc_id, choice, &mut character) {
                            eprintln!("ERROR: {}", e);
                        }
                    }
                    Err(e) => eprintln!("ERROR: {}", e),
                }
                continue;
            }
        }

        match run_year(&mut manager, &mut character, presenter.as_mut()) {
            Ok(Some(report)) if report.completed => {
                println!("\nThe story of '{}' has reached its end.", report.arc_id);
            }
            Ok(Some(_)) => {}
            Ok(None) => println!("A quiet year passes."),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    }

    print_summary(&character, &manager);

    if let Some(ref path) = options.save {
        if let Err(e) = manager.snapshot().save_to_path(path) {
            eprintln!("ERROR: could not save {}: {}", path.display(), e);
            process::exit(1);
        }
        println!("Saved to {}", path.display());
    }
}

fn random_npc(rng: &mut StdRng, id: u64) -> NpcProfile {
    let name = NPC_NAMES.choose(rng).copied().unwrap_or("A stranger");
    let role = Role::ALL.choose(rng).copied().unwrap_or(Role::Farmer);
    let gender = if rng.gen_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    NpcProfile {
        id: NpcId(id),
        name: name.to_string(),
        role,
        gender,
        married: rng.gen_bool(0.5),
    }
}

fn print_summary(character: &Character, manager: &ArcManager) {
    println!("\n=== Chronicle of {} ===", character.name);
    println!("Age {}, health {}, wealth {}", character.age, character.health, character.wealth);
    for (name, value) in &character.skills {
        println!("  skill {:<12} {}", name, value);
    }
    for (name, value) in &character.attributes {
        println!("  attribute {:<8} {}", name, value);
    }
    if character.completed_arcs.is_empty() {
        println!("No stories completed.");
    } else {
        println!("Completed: {}", character.completed_arcs.join(", "));
    }
    for instance in manager.active() {
        println!(
            "Still unfolding: {} (stage {} of {})",
            instance.id(),
            instance.current_stage() + 1,
            instance.definition().stage_count()
        );
    }
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        catalog: PathBuf::from("content/arcs.ron"),
        config: None,
        seed: 42,
        name: "Edmund".to_string(),
        role: Role::Farmer,
        gender: Gender::Male,
        age: 18,
        years: 20,
        auto: false,
        encounters: false,
        load: None,
        save: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                options.catalog = PathBuf::from(&args[i]);
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                options.config = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                options.seed = args[i].parse().unwrap_or(42);
            }
            "--name" if i + 1 < args.len() => {
                i += 1;
                options.name = args[i].clone();
            }
            "--role" if i + 1 < args.len() => {
                i += 1;
                options.role = Role::from_tag(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown role: {}", args[i]);
                    process::exit(1);
                });
            }
            "--gender" if i + 1 < args.len() => {
                i += 1;
                options.gender = Gender::from_tag(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown gender: {}", args[i]);
                    process::exit(1);
                });
            }
            "--age" if i + 1 < args.len() => {
                i += 1;
                options.age = args[i].parse().unwrap_or(18);
            }
            "--years" if i + 1 < args.len() => {
                i += 1;
                options.years = args[i].parse().unwrap_or(20);
            }
            "--load" if i + 1 < args.len() => {
                i += 1;
                options.load = Some(PathBuf::from(&args[i]));
            }
            "--save" if i + 1 < args.len() => {
                i += 1;
                options.save = Some(PathBuf::from(&args[i]));
            }
            "--auto" => options.auto = true,
            "--encounters" => options.encounters = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn print_usage() {
    println!("Usage: chronicle [--catalog <path>] [--config <path>] [--seed <n>]");
    println!("                 [--name <name>] [--role <role>] [--gender <gender>]");
    println!("                 [--age <n>] [--years <n>] [--auto] [--encounters]");
    println!("                 [--load <save.ron>] [--save <save.ron>]");
    println!();
    println!("  roles: farmer, craftsman, merchant, priest, knight, noble, king");
    println!("  genders: male, female");
}
