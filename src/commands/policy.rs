//! Prints the role-to-capability table and per-role navigation.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use clubdesk_auth::rbac::{Capability, RbacEnforcer, Section};
use clubdesk_core::error::AppError;
use clubdesk_entity::user::Role;

use crate::output::{self, OutputFormat};

/// Arguments for the policy command
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// Show the capabilities and menu sections of one role only
    #[arg(short, long)]
    pub role: Option<String>,
}

/// One capability across every role.
#[derive(Debug, Serialize, Tabled)]
struct CapabilityRow {
    capability: String,
    admin: &'static str,
    staff: &'static str,
    finance: &'static str,
    #[tabled(rename = "no role")]
    none: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
struct SectionRow {
    section: &'static str,
    requires: String,
}

/// Execute the policy command
pub fn execute(args: &PolicyArgs, format: OutputFormat) -> Result<(), AppError> {
    let rbac = RbacEnforcer::new();

    let Some(role) = &args.role else {
        let rows: Vec<CapabilityRow> = Capability::ALL
            .into_iter()
            .map(|cap| CapabilityRow {
                capability: cap.to_string(),
                admin: output::mark(rbac.decide(Some(Role::Admin), cap)),
                staff: output::mark(rbac.decide(Some(Role::Staff), cap)),
                finance: output::mark(rbac.decide(Some(Role::Finance), cap)),
                none: output::mark(rbac.decide(None, cap)),
            })
            .collect();
        output::print_list(&rows, format);
        return Ok(());
    };

    let role: Role = role.parse()?;

    println!("{} capabilities:", role.label());
    for cap in rbac.permissions_for_role(Some(role)) {
        println!("  {cap}");
    }
    println!();

    let rows: Vec<SectionRow> = Section::visible_to(Some(role))
        .into_iter()
        .map(|section| SectionRow {
            section: section.label(),
            requires: section
                .required_capability()
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
