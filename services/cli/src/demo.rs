use crate::infra::{standard_ladder, ModeOverride};
use clap::Args;
use excuse_ladder::config::AppConfig;
use excuse_ladder::error::AppError;
use excuse_ladder::workflows::excuses::{
    Capability, Category, Disposition, EmployeeRef, Excuse,
};
use serde_json::json;

#[derive(Args, Debug)]
pub(crate) struct DisposeArgs {
    /// Employee number of the person filing the excuse
    #[arg(long)]
    pub(crate) employee_id: u32,
    /// Employee display name
    #[arg(long)]
    pub(crate) name: String,
    /// Employee email, used as the recipient of the ruling
    #[arg(long)]
    pub(crate) email: String,
    /// Excuse category (minor, moderate_electrical, moderate_family, complex, implausible)
    #[arg(long)]
    pub(crate) category: Category,
    /// Free-form description of the excuse
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Handler mode override as KEY=MODE (repeatable), e.g. ceo=delegate
    #[arg(long = "mode", value_parser = crate::infra::parse_mode_override)]
    pub(crate) modes: Vec<ModeOverride>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RosterArgs {
    /// Only list handlers that hold this capability
    #[arg(long)]
    pub(crate) capability: Option<Capability>,
}

pub(crate) fn run_dispose(config: &AppConfig, args: DisposeArgs) -> Result<(), AppError> {
    let DisposeArgs {
        employee_id,
        name,
        email,
        category,
        description,
        modes,
    } = args;

    let ladder = standard_ladder(config);
    for ModeOverride { key, mode } in &modes {
        ladder.chain.set_mode(key, *mode)?;
    }

    let mut excuse = Excuse::new(EmployeeRef::new(employee_id, name, email), category, description);
    let disposition = ladder.chain.dispose(&mut excuse)?;

    let payload = json!({
        "disposition": disposition,
        "notices": ladder.notifier.outbox(),
        "dossier": ladder.registry.entries(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub(crate) fn run_roster(config: &AppConfig, args: RosterArgs) -> Result<(), AppError> {
    let ladder = standard_ladder(config);
    let views = match args.capability {
        Some(capability) => ladder.chain.handlers_with_capability(capability)?,
        None => ladder.chain.handlers(),
    };

    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

pub(crate) fn run_demo(config: &AppConfig) -> Result<(), AppError> {
    let ladder = standard_ladder(config);
    let roster = &config.roster;

    println!("Excuse ladder demo");
    println!("Ladder:");
    for view in ladder.chain.handlers() {
        println!(
            "  - {} ({}) mode={} authority={:?}",
            view.key, view.name, view.mode, view.capabilities
        );
    }

    let staff = roster.ceo.clone();
    let cases = [
        (Category::Implausible, "A flock of pigeons carried my car keys away"),
        (Category::Minor, "Missed the early bus"),
        (Category::ModerateElectrical, "Power cut in my building"),
    ];
    println!("\nSubmitting excuses for {} (employee {})", staff.name, staff.id);
    for (category, description) in cases {
        let mut excuse = Excuse::new(staff.clone(), category, description);
        let disposition = ladder.chain.dispose(&mut excuse)?;
        println!("- {category}: {}", describe(&disposition));
        println!("  dossier entries so far: {}", ladder.registry.len());
    }

    println!("\nNotices sent:");
    for notice in ladder.notifier.outbox() {
        println!("  - to {} | {}", notice.to, notice.subject);
    }

    println!("\nA lazy CEO leaves implausible cases unhandled:");
    ladder.chain.set_mode_by_label("ceo", "delegate")?;
    let mut excuse = Excuse::new(staff, Category::Implausible, "My cat filed a complaint");
    let disposition = ladder.chain.dispose(&mut excuse)?;
    println!("- implausible: {}", describe(&disposition));

    let cleared = ladder.registry.clear_entries()?;
    println!("\nCleared {cleared} dossier entr{}", if cleared == 1 { "y" } else { "ies" });
    Ok(())
}

fn describe(disposition: &Disposition) -> String {
    match disposition {
        Disposition::Ruled { key, name } => format!("ruled by {name} ({key})"),
        Disposition::Dropped => "dropped, nobody ruled".to_string(),
    }
}
