//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Human label for a stored role name.
///
/// Usage in templates: `{{ admin.role|role_label }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn role_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(label_for(&value.to_string()))
}

fn label_for(role: &str) -> String {
    match role {
        "super_admin" => "Super admin".to_owned(),
        "admin" => "Admin".to_owned(),
        other => other.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for() {
        assert_eq!(label_for("super_admin"), "Super admin");
        assert_eq!(label_for("admin"), "Admin");
        assert_eq!(label_for("viewer"), "viewer");
    }
}
