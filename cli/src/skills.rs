use console::style;
use skillbox_core::{Catalog, CommandOutcome, ExitState, LoadRecord, LoadedSkill};

pub fn print_catalog(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("{} No skills installed", style("!").yellow());
        println!();
        if catalog.searched.is_empty() {
            println!("No skill directories exist yet. Create one:");
            println!("  mkdir -p .agent/skills/my-skill");
            println!("  echo '# My Skill' > .agent/skills/my-skill/SKILL.md");
        } else {
            println!("Searched:");
            for root in &catalog.searched {
                println!("  {}", root.display());
            }
        }
        return;
    }

    println!(
        "{} Installed skills ({})",
        style("✓").green().bold(),
        catalog.len()
    );
    println!();

    for skill in &catalog.skills {
        if skill.description.is_empty() {
            println!("  {}", style(&skill.name).white().bold());
        } else {
            println!(
                "  {} — {}",
                style(&skill.name).white().bold(),
                skill.description
            );
        }
        if skill.display_name != skill.name {
            println!("    Name:  {}", skill.display_name);
        }
        println!(
            "    {}  {}",
            style(skill.scope.to_string()).dim(),
            skill.path.display()
        );
    }
}

pub fn print_loaded(loaded: &LoadedSkill) {
    println!(
        "{} {} {}",
        style("→").cyan(),
        style(&loaded.skill_name).white().bold(),
        style(loaded.base_dir.display()).dim()
    );
    println!();
    println!("{}", loaded.content);
}

pub fn print_records(records: &[LoadRecord]) {
    if records.is_empty() {
        println!("{} No skills loaded yet", style("!").yellow());
        return;
    }

    for record in records {
        println!(
            "  {} {} {}",
            style(&record.name).white().bold(),
            style(record.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")).dim(),
            record.base_dir.display()
        );
    }
}

pub fn print_outcome(outcome: &CommandOutcome) {
    match &outcome.status {
        ExitState::Exited { code: 0 } => {
            print!("{}", outcome.stdout_or_placeholder());
            if outcome.stdout.is_empty() {
                println!();
            }
            eprint!("{}", outcome.stderr);
        }
        ExitState::Exited { .. } | ExitState::TimedOut => {
            print!("{}", outcome.stdout);
            eprint!("{}", outcome.stderr);
        }
        ExitState::SpawnFailed { message } => {
            eprintln!("{} {}", style("✗").red().bold(), message);
        }
    }
}
