//! Login users and their attributes (`login user`, `user attribute`).
//!
//! The device never echoes passwords in `show config`, so records parsed
//! back after a write legitimately lack the secret. Synthesis therefore
//! works from partial records, and attribute commands only emit fields that
//! were explicitly set so unspecified ones keep their device-side value.

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

pub const VALID_CONNECTIONS: [&str; 6] = ["serial", "telnet", "remote", "ssh", "sftp", "http"];
pub const VALID_GUI_PAGES: [&str; 3] = ["dashboard", "lan-map", "config"];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UserAttributes {
    /// `None` means not present in the dump. The device default is enabled,
    /// which parsing materializes as `Some(true)` when the attribute line
    /// omits the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrator: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub connection: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub gui_pages: Vec<String>,
    /// Seconds, 0 meaning no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_timer: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UserConfig {
    pub username: String,
    /// Absent when the record came from a dump, present when it is desired
    /// state about to be written.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub encrypted: bool,
    pub attributes: UserAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AdminConfig {
    pub users: Vec<UserConfig>,
}

/// Parses `login user` and `user attribute` lines, merging both under the
/// username. An attribute line for a user with no login line still creates
/// a record, since the dump order is not guaranteed.
pub fn parse_admin_config(raw: &str) -> Result<AdminConfig, ParseError> {
    let mut users: Vec<UserConfig> = Vec::new();

    let mut entry = |username: &str, users: &mut Vec<UserConfig>| -> usize {
        match users.iter().position(|u| u.username == username) {
            Some(i) => i,
            None => {
                users.push(UserConfig {
                    username: username.to_string(),
                    ..UserConfig::default()
                });
                users.len() - 1
            }
        }
    };

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if let Some(rest) = line.strip_prefix("login user ") {
            let (username, tail) = rest
                .split_once(char::is_whitespace)
                .map(|(u, t)| (u, Some(t.trim())))
                .unwrap_or((rest.trim(), None));
            let i = entry(username, &mut users);
            match tail {
                Some(tail) => match tail.strip_prefix("encrypted ") {
                    Some(hash) => {
                        users[i].password = Some(hash.to_string());
                        users[i].encrypted = true;
                    }
                    None => {
                        users[i].password = Some(tail.to_string());
                        users[i].encrypted = false;
                    }
                },
                // `show config` prints the bare username form.
                None => users[i].password = None,
            }
        } else if let Some(rest) = line.strip_prefix("user attribute ") {
            let (username, attr_str) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| ParseError::malformed(line, "missing attribute list"))?;
            let i = entry(username, &mut users);
            users[i].attributes = parse_attributes(attr_str);
        }
    }

    Ok(AdminConfig { users })
}

/// Key=value pairs. Unknown keys are skipped for firmware drift; an absent
/// `administrator` key means the device default, which is enabled.
fn parse_attributes(attr_str: &str) -> UserAttributes {
    let mut attrs = UserAttributes::default();

    for part in attr_str.split_whitespace() {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            // "on", "1" and "2" all enable administration; "2" is the
            // password-less elevation mode on some models.
            "administrator" => {
                attrs.administrator = Some(matches!(value, "on" | "1" | "2"));
            }
            "connection" if !value.is_empty() && value != "none" => {
                attrs.connection = value.split(',').map(str::to_string).collect();
            }
            "gui-page" if !value.is_empty() && value != "none" => {
                attrs.gui_pages = value.split(',').map(str::to_string).collect();
            }
            "login-timer" => {
                if let Ok(timer) = value.parse() {
                    attrs.login_timer = Some(timer);
                }
            }
            _ => {}
        }
    }

    if attrs.administrator.is_none() {
        attrs.administrator = Some(true);
    }
    attrs
}

/// `login user <name> [encrypted] <password>`. Fails when the record lacks
/// a password rather than emitting a truncated command.
pub fn build_user_command(user: &UserConfig) -> Result<String, ValidateError> {
    let password = user
        .password
        .as_deref()
        .ok_or_else(|| ValidateError::new("password is required to create a user"))?;
    if user.encrypted {
        Ok(format!("login user {} encrypted {password}", user.username))
    } else {
        Ok(format!("login user {} {password}", user.username))
    }
}

/// `user attribute <name> k=v ...`, emitting only explicitly set fields.
/// Returns `None` when everything is unset.
pub fn build_user_attribute_command(username: &str, attrs: &UserAttributes) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(admin) = attrs.administrator {
        parts.push(format!(
            "administrator={}",
            if admin { "on" } else { "off" }
        ));
    }
    if !attrs.connection.is_empty() {
        parts.push(format!("connection={}", attrs.connection.join(",")));
    }
    if !attrs.gui_pages.is_empty() {
        parts.push(format!("gui-page={}", attrs.gui_pages.join(",")));
    }
    if let Some(timer) = attrs.login_timer {
        parts.push(format!("login-timer={timer}"));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!("user attribute {username} {}", parts.join(" ")))
}

pub fn build_delete_user_command(username: &str) -> String {
    format!("no login user {username}")
}

pub fn build_delete_user_attribute_command(username: &str) -> String {
    format!("no user attribute {username}")
}

// The device grep has no OR operator; "user" matches both line forms.
pub fn build_show_users_command() -> String {
    r#"show config | grep "user""#.to_string()
}

pub fn validate_user(user: &UserConfig) -> Result<(), ValidateError> {
    validate_user_shape(user)?;
    if user.password.is_none() {
        return Err(ValidateError::new("password is required"));
    }
    Ok(())
}

/// Attribute-only updates work from imported users whose password is not
/// known, so this skips the password check.
pub fn validate_user_for_attribute_update(user: &UserConfig) -> Result<(), ValidateError> {
    validate_user_shape(user)
}

fn validate_user_shape(user: &UserConfig) -> Result<(), ValidateError> {
    if user.username.is_empty() {
        return Err(ValidateError::new("username is required"));
    }
    let mut chars = user.username.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidateError::new(
            "username must start with a letter and contain only alphanumerics and underscores",
        ));
    }
    for conn in &user.attributes.connection {
        if !VALID_CONNECTIONS.contains(&conn.as_str()) {
            return Err(ValidateError::new(format!(
                "invalid connection type '{conn}'"
            )));
        }
    }
    for page in &user.attributes.gui_pages {
        if !VALID_GUI_PAGES.contains(&page.as_str()) {
            return Err(ValidateError::new(format!("invalid GUI page '{page}'")));
        }
    }
    Ok(())
}
