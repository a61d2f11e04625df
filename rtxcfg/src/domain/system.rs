//! System-level settings: timezone, console, packet buffers, statistics.

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

pub const VALID_ENCODINGS: [&str; 4] = ["ja.utf8", "ja.sjis", "ascii", "euc-jp"];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConsoleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// A number or `infinity`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferSize {
    Small,
    Middle,
    Large,
}

impl BufferSize {
    pub fn as_str(self) -> &'static str {
        match self {
            BufferSize::Small => "small",
            BufferSize::Middle => "middle",
            BufferSize::Large => "large",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "small" => Some(BufferSize::Small),
            "middle" => Some(BufferSize::Middle),
            "large" => Some(BufferSize::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketBufferConfig {
    pub size: BufferSize,
    pub max_buffer: u32,
    pub max_free: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatisticsConfig {
    pub traffic: bool,
    pub nat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SystemConfig {
    /// UTC offset in `±HH:MM` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<ConsoleConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub packet_buffers: Vec<PacketBufferConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsConfig>,
}

pub fn parse_system_config(raw: &str) -> Result<SystemConfig, ParseError> {
    let mut config = SystemConfig::default();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if let Some(tz) = line.strip_prefix("timezone ") {
            config.timezone = Some(tz.trim().to_string());
        } else if let Some(value) = line.strip_prefix("console character ") {
            config.console.get_or_insert_with(ConsoleConfig::default).character =
                Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("console lines ") {
            config.console.get_or_insert_with(ConsoleConfig::default).lines =
                Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("console prompt ") {
            let prompt = value.trim().trim_matches('"');
            config.console.get_or_insert_with(ConsoleConfig::default).prompt =
                Some(prompt.to_string());
        } else if let Some(rest) = line.strip_prefix("system packet-buffer ") {
            let Some(pb) = parse_packet_buffer(rest) else {
                continue;
            };
            match config.packet_buffers.iter_mut().find(|b| b.size == pb.size) {
                Some(existing) => *existing = pb,
                None => config.packet_buffers.push(pb),
            }
        } else if let Some(state) = line.strip_prefix("statistics traffic ") {
            config
                .statistics
                .get_or_insert_with(StatisticsConfig::default)
                .traffic = parse_on_off(line, state)?;
        } else if let Some(state) = line.strip_prefix("statistics nat ") {
            config
                .statistics
                .get_or_insert_with(StatisticsConfig::default)
                .nat = parse_on_off(line, state)?;
        }
    }

    Ok(config)
}

fn parse_on_off(line: &str, state: &str) -> Result<bool, ParseError> {
    match state.trim() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(ParseError::malformed(
            line,
            format!("expected on or off, got '{other}'"),
        )),
    }
}

/// `<size> max-buffer=<n> max-free=<n>`.
fn parse_packet_buffer(rest: &str) -> Option<PacketBufferConfig> {
    let mut tokens = rest.split_whitespace();
    let size = BufferSize::parse(tokens.next()?)?;
    let mut max_buffer = None;
    let mut max_free = None;
    for token in tokens {
        if let Some(value) = token.strip_prefix("max-buffer=") {
            max_buffer = value.parse().ok();
        } else if let Some(value) = token.strip_prefix("max-free=") {
            max_free = value.parse().ok();
        }
    }
    Some(PacketBufferConfig {
        size,
        max_buffer: max_buffer?,
        max_free: max_free?,
    })
}

pub fn build_timezone_command(tz: &str) -> String {
    format!("timezone {tz}")
}

pub fn build_delete_timezone_command() -> String {
    "no timezone".to_string()
}

pub fn build_console_character_command(encoding: &str) -> String {
    format!("console character {encoding}")
}

pub fn build_console_lines_command(lines: &str) -> String {
    format!("console lines {lines}")
}

pub fn build_console_prompt_command(prompt: &str) -> String {
    if prompt.contains(' ') {
        format!("console prompt \"{prompt}\"")
    } else {
        format!("console prompt {prompt}")
    }
}

pub fn build_packet_buffer_command(pb: &PacketBufferConfig) -> String {
    format!(
        "system packet-buffer {} max-buffer={} max-free={}",
        pb.size.as_str(),
        pb.max_buffer,
        pb.max_free
    )
}

pub fn build_delete_packet_buffer_command(size: BufferSize) -> String {
    format!("no system packet-buffer {}", size.as_str())
}

pub fn build_statistics_traffic_command(enabled: bool) -> String {
    format!("statistics traffic {}", if enabled { "on" } else { "off" })
}

pub fn build_statistics_nat_command(enabled: bool) -> String {
    format!("statistics nat {}", if enabled { "on" } else { "off" })
}

pub fn build_show_system_command() -> String {
    r#"show config | grep -E "(timezone|console|packet-buffer|statistics)""#.to_string()
}

/// Full reset of whatever the record carries, one delete per set field.
pub fn build_delete_system_commands(config: &SystemConfig) -> Vec<String> {
    let mut commands = Vec::new();
    if config.timezone.is_some() {
        commands.push(build_delete_timezone_command());
    }
    if let Some(console) = &config.console {
        if console.character.is_some() {
            commands.push("no console character".to_string());
        }
        if console.lines.is_some() {
            commands.push("no console lines".to_string());
        }
        if console.prompt.is_some() {
            commands.push("no console prompt".to_string());
        }
    }
    for pb in &config.packet_buffers {
        commands.push(build_delete_packet_buffer_command(pb.size));
    }
    if config.statistics.is_some() {
        commands.push("no statistics traffic".to_string());
        commands.push("no statistics nat".to_string());
    }
    commands
}

pub fn validate_system_config(config: &SystemConfig) -> Result<(), ValidateError> {
    if let Some(tz) = &config.timezone {
        if !is_valid_timezone(tz) {
            return Err(ValidateError::new(format!(
                "invalid timezone '{tz}' (expected ±HH:MM)"
            )));
        }
    }
    if let Some(console) = &config.console {
        if let Some(encoding) = &console.character {
            if !VALID_ENCODINGS.contains(&encoding.as_str()) {
                return Err(ValidateError::new(format!(
                    "invalid character encoding '{encoding}'"
                )));
            }
        }
        if let Some(lines) = &console.lines {
            let ok = lines == "infinity" || lines.parse::<u32>().map_or(false, |n| n > 0);
            if !ok {
                return Err(ValidateError::new(format!(
                    "invalid console lines '{lines}' (expected positive integer or 'infinity')"
                )));
            }
        }
    }
    for pb in &config.packet_buffers {
        if pb.max_buffer == 0 || pb.max_free == 0 {
            return Err(ValidateError::new(format!(
                "packet buffer counts must be positive for size {}",
                pb.size.as_str()
            )));
        }
        if pb.max_free > pb.max_buffer {
            return Err(ValidateError::new(format!(
                "max_free cannot exceed max_buffer for size {}",
                pb.size.as_str()
            )));
        }
    }
    Ok(())
}

/// `±HH:MM`, sign required.
fn is_valid_timezone(tz: &str) -> bool {
    let Some(rest) = tz.strip_prefix(['+', '-']) else {
        return false;
    };
    let Some((hours, minutes)) = rest.split_once(':') else {
        return false;
    };
    hours.len() == 2
        && minutes.len() == 2
        && hours.chars().all(|c| c.is_ascii_digit())
        && minutes.chars().all(|c| c.is_ascii_digit())
}
