/// Arc Linter — validates arc catalogs and reports authoring smells.
///
/// Usage: arc_linter <catalog_file_or_dir>
///
/// Hard errors come from catalog validation (bad keys, unreachable
/// branches, zero delays). Warnings flag content that loads but probably
/// does not play the way the author meant.
use arc_engine::core::catalog::ArcCatalog;
use arc_engine::schema::arc::ArcDefinition;
use arc_engine::schema::character::{BASE_ATTRIBUTES, BASE_SKILLS};
use arc_engine::schema::effect::{Effect, EffectSet};
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: arc_linter <catalog_file_or_dir>");
        process::exit(0);
    }

    let catalog_path = Path::new(&args[1]);
    let mut catalog = ArcCatalog::default();
    let mut errors = Vec::new();

    if catalog_path.is_file() {
        match ArcCatalog::load_from_ron(catalog_path) {
            Ok(loaded) => catalog.merge(loaded),
            Err(e) => errors.push(format!("{}: {}", catalog_path.display(), e)),
        }
    } else if catalog_path.is_dir() {
        load_catalogs_recursive(catalog_path, &mut catalog, &mut errors);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", catalog_path.display());
        process::exit(1);
    }

    println!(
        "Loaded {} arcs in {} exclusion groups",
        catalog.len(),
        catalog.exclusion_groups().len()
    );

    let warnings = lint_catalog(&catalog);

    println!("\n=== Arc Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_catalogs_recursive(dir: &Path, catalog: &mut ArcCatalog, errors: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        errors.push(format!("{}: unreadable directory", dir.display()));
        return;
    };

    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            load_catalogs_recursive(&path, catalog, errors);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match ArcCatalog::load_from_ron(&path) {
                Ok(loaded) => {
                    println!("  Loaded: {}", path.display());
                    catalog.merge(loaded);
                }
                // engine.ron and other non-catalog files land here too
                Err(e) => println!("  Skipped {}: {}", path.display(), e),
            }
        }
    }
}

fn lint_catalog(catalog: &ArcCatalog) -> Vec<String> {
    let mut warnings = Vec::new();

    let grouped: HashSet<&str> = catalog
        .exclusion_groups()
        .iter()
        .flat_map(|g| g.members.iter().map(String::as_str))
        .collect();

    for arc in catalog.iter() {
        lint_arc(arc, &mut warnings);

        if arc.npc_affinity.is_some() && !grouped.contains(arc.id.as_str()) {
            warnings.push(format!(
                "Arc '{}' can start from encounters but belongs to no exclusion group",
                arc.id
            ));
        }
    }

    for group in catalog.exclusion_groups() {
        if group.members.len() < 2 {
            warnings.push(format!(
                "Exclusion group '{}' has a single member and excludes nothing",
                group.name
            ));
        }
    }

    warnings
}

fn lint_arc(arc: &ArcDefinition, warnings: &mut Vec<String>) {
    if arc.stages.len() < 2 {
        warnings.push(format!("Arc '{}' has only one stage", arc.id));
    }
    if arc.role_restricted && arc.allowed_roles.is_empty() {
        warnings.push(format!(
            "Arc '{}' is role-restricted but lists no roles, so it can never start",
            arc.id
        ));
    }

    let layout = arc.history_layout();
    for (position, stage) in arc.stages.iter().enumerate() {
        check_stat_names(&arc.id, position, &stage.effects, warnings);
        for choice in &stage.choices {
            check_stat_names(&arc.id, position, &choice.effects, warnings);
        }
        for branch in &stage.branches {
            check_stat_names(&arc.id, position, &branch.effects, warnings);
            for choice in &branch.choices {
                check_stat_names(&arc.id, position, &choice.effects, warnings);
            }
        }

        if stage.choices.len() == 1 {
            warnings.push(format!(
                "Arc '{}' stage {} offers a single choice",
                arc.id, position
            ));
        }

        // A stage whose default rendition is empty should have a branch
        // for every choice recorded in the history slot it keys on.
        if stage.choices.is_empty() && !stage.branches.is_empty() {
            let keyed: HashSet<(usize, usize)> = stage
                .branches
                .iter()
                .map(|b| (b.condition.stage, b.condition.choice))
                .collect();
            for slot in keyed.iter().map(|(s, _)| *s).collect::<HashSet<_>>() {
                let Some(recorded_by) = layout.stage_for(slot, position) else {
                    continue;
                };
                let available = arc.stages[recorded_by].max_choices();
                let uncovered: Vec<usize> = (0..available)
                    .filter(|c| !keyed.contains(&(slot, *c)))
                    .collect();
                if !uncovered.is_empty() {
                    warnings.push(format!(
                        "Arc '{}' stage {} falls back to its plain text after stage {} choices {:?}",
                        arc.id, position, recorded_by, uncovered
                    ));
                }
            }
        }
    }
}

fn check_stat_names(arc: &str, stage: usize, effects: &EffectSet, warnings: &mut Vec<String>) {
    for (effect, _) in effects.iter() {
        let unknown = match effect {
            Effect::Skill(name) => !BASE_SKILLS.contains(&name.as_str()),
            Effect::Attribute(name) => !BASE_ATTRIBUTES.contains(&name.as_str()),
            _ => false,
        };
        if unknown {
            warnings.push(format!(
                "Arc '{}' stage {} uses '{}', which default characters do not have",
                arc, stage, effect
            ));
        }
    }
}
