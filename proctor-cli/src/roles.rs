//! Role catalogue and interactive role selection.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};

/// The fixed role catalogue offered at session start. A free-form custom role
/// is always available as the last choice.
pub const ROLES: [&str; 10] = [
    "Software Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "Data Scientist",
    "Product Manager",
    "DevOps Engineer",
    "UX Designer",
    "Marketing Manager",
    "Sales Representative",
];

/// Resolve the interview role: use the preset when given, otherwise prompt
/// with the catalogue plus a custom entry.
pub fn choose_role(preset: Option<String>) -> Result<String> {
    if let Some(role) = preset {
        let role = role.trim().to_string();
        if !role.is_empty() {
            return Ok(role);
        }
    }

    let mut items: Vec<&str> = ROLES.to_vec();
    items.push("Custom role...");

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which role are you interviewing for?")
        .items(&items)
        .default(0)
        .interact()?;

    if selection < ROLES.len() {
        return Ok(ROLES[selection].to_string());
    }

    let custom: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter the role")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("role must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(custom.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_ten_unique_roles() {
        let mut sorted: Vec<&str> = ROLES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 10);
    }

    #[test]
    fn preset_role_skips_prompt() {
        assert_eq!(
            choose_role(Some("Staff Engineer".into())).unwrap(),
            "Staff Engineer"
        );
        assert_eq!(
            choose_role(Some("  Data Scientist  ".into())).unwrap(),
            "Data Scientist"
        );
    }
}
