//! Configuration for the SimTracker daemon
//!
//! Loads a TOML file into [`Config`]. Loading is deliberately forgiving:
//!
//! - A missing or unreadable file yields [`Config::default`] with a warning.
//! - Each field is read on its own. A malformed value (wrong type, numeric
//!   string that does not parse) logs a warning and keeps that field's default.
//! - Unknown sections and keys are ignored. `[vicon]` is read as `[tracker]`.
//! - A file that does not parse as TOML is read again line by line: each
//!   `key = value` under a `[section]` header is taken on its own, bare words
//!   become strings, and lines that make no sense are skipped with a warning.
//!
//! After reading, [`Config::validate`] repairs values the tracker cannot run
//! with (empty server identifier, non-positive rate or reset interval).
//!
//! # Example
//!
//! ```toml
//! [tracker]
//! object_name = "Origins"
//! server_identifier = "10.0.0.200"
//! update_frequency_hz = 200
//!
//! [position]
//! x = 1.0
//! y = -2.0
//! z = 1.5
//!
//! [rotation]
//! yaw = 0.0
//! pitch = 0.0
//! roll = 0.0
//!
//! [trajectory]
//! mode = "circular"
//! reset_interval_s = 120.0
//!
//! [circular]
//! radius = 1.0
//! speed = 1.0
//! ```

use crate::engine::{CircularParams, InitialPose, LissajousParams, TrajectoryMode, TrajectoryParams};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

const DEFAULT_OBJECT_NAME: &str = "Origins";
const DEFAULT_SERVER_IDENTIFIER: &str = "10.0.0.200";
const DEFAULT_UPDATE_FREQUENCY_HZ: u32 = 200;
const DEFAULT_RESET_INTERVAL_S: f64 = 120.0;

/// Default tracking port, the one motion-capture clients conventionally use.
pub const DEFAULT_SINK_PORT: u16 = 3883;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub position: PositionConfig,
    pub rotation: RotationConfig,
    pub trajectory: TrajectoryConfig,
    pub lissajous: LissajousParams,
    pub circular: CircularParams,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
}

/// Tracked object identity and publish rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerConfig {
    /// Name the pose is published under
    pub object_name: String,
    /// Host the tracker serves from (sink bind address)
    pub server_identifier: String,
    /// Driver tick rate in Hz
    pub update_frequency_hz: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            object_name: DEFAULT_OBJECT_NAME.to_string(),
            server_identifier: DEFAULT_SERVER_IDENTIFIER.to_string(),
            update_frequency_hz: DEFAULT_UPDATE_FREQUENCY_HZ,
        }
    }
}

/// Initial position (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: -2.0,
            z: 1.5,
        }
    }
}

/// Initial orientation (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RotationConfig {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Startup mode and restart period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryConfig {
    pub mode: TrajectoryMode,
    pub reset_interval_s: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            mode: TrajectoryMode::Static,
            reset_interval_s: DEFAULT_RESET_INTERVAL_S,
        }
    }
}

/// Pose sink selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkConfig {
    /// "udp" or "console"
    pub kind: String,
    /// UDP port bound on `server_identifier`
    pub port: u16,
    /// Fixed UDP destinations in addition to self-registered clients
    pub destinations: Vec<String>,
    /// Log a full pose dump every N ticks (0 = never)
    pub print_every: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: "udp".to_string(),
            port: DEFAULT_SINK_PORT,
            destinations: Vec::new(),
            print_every: 50,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Falls back to defaults when the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!(
                    "Could not open {}: {}. Using default values.",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text, field by field, then validate.
    pub fn from_toml_str(contents: &str) -> Self {
        let table = match contents.parse::<Table>() {
            Ok(table) => table,
            Err(e) => {
                log::warn!(
                    "Config is not valid TOML ({}). Reading it line by line.",
                    e.message()
                );
                recover_table(contents)
            }
        };
        let reader = FieldReader::new(&table);
        let mut config = Self::default();

        reader.string("tracker", &["object_name"], &mut config.tracker.object_name);
        reader.string(
            "tracker",
            &["server_identifier", "server_ip"],
            &mut config.tracker.server_identifier,
        );
        reader.positive_u32(
            "tracker",
            &["update_frequency_hz", "frequency"],
            &mut config.tracker.update_frequency_hz,
            DEFAULT_UPDATE_FREQUENCY_HZ,
        );

        reader.f64("position", &["x", "x1"], &mut config.position.x);
        reader.f64("position", &["y", "x2"], &mut config.position.y);
        reader.f64("position", &["z", "x3"], &mut config.position.z);

        reader.f64("rotation", &["yaw"], &mut config.rotation.yaw);
        reader.f64("rotation", &["pitch"], &mut config.rotation.pitch);
        reader.f64("rotation", &["roll"], &mut config.rotation.roll);

        reader.mode("trajectory", &["mode"], &mut config.trajectory.mode);
        reader.f64(
            "trajectory",
            &["reset_interval_s", "reset_interval"],
            &mut config.trajectory.reset_interval_s,
        );

        let lissajous = &mut config.lissajous;
        reader.f64("lissajous", &["amplitude_x", "A"], &mut lissajous.amplitude_x);
        reader.f64("lissajous", &["amplitude_y", "B"], &mut lissajous.amplitude_y);
        reader.f64("lissajous", &["frequency_x", "a"], &mut lissajous.frequency_x);
        reader.f64("lissajous", &["frequency_y", "b"], &mut lissajous.frequency_y);
        reader.f64("lissajous", &["phase", "delta"], &mut lissajous.phase);

        reader.f64("circular", &["radius"], &mut config.circular.radius);
        reader.f64("circular", &["speed"], &mut config.circular.speed);

        reader.string("sink", &["kind"], &mut config.sink.kind);
        reader.u16("sink", &["port"], &mut config.sink.port);
        reader.string_list("sink", &["destinations"], &mut config.sink.destinations);
        reader.u32("sink", &["print_every"], &mut config.sink.print_every);

        reader.string("logging", &["level"], &mut config.logging.level);

        config.validate();
        config
    }

    /// Repair values the tracker cannot run with, logging each repair.
    pub fn validate(&mut self) {
        if self.tracker.server_identifier.trim().is_empty() {
            log::warn!(
                "Server identifier is empty. Using default '{}'.",
                DEFAULT_SERVER_IDENTIFIER
            );
            self.tracker.server_identifier = DEFAULT_SERVER_IDENTIFIER.to_string();
        }
        if self.tracker.update_frequency_hz == 0 {
            log::warn!(
                "Invalid update frequency 0. Using default {} Hz.",
                DEFAULT_UPDATE_FREQUENCY_HZ
            );
            self.tracker.update_frequency_hz = DEFAULT_UPDATE_FREQUENCY_HZ;
        }
        let interval = self.trajectory.reset_interval_s;
        if !interval.is_finite() || interval <= 0.0 {
            log::warn!(
                "Invalid reset interval {}. Using default {}s.",
                interval,
                DEFAULT_RESET_INTERVAL_S
            );
            self.trajectory.reset_interval_s = DEFAULT_RESET_INTERVAL_S;
        }
    }

    /// Initial pose block for the engine.
    pub fn initial_pose(&self) -> InitialPose {
        InitialPose {
            position: [self.position.x, self.position.y, self.position.z],
            euler_degrees: [self.rotation.yaw, self.rotation.pitch, self.rotation.roll],
        }
    }

    /// Immutable parameter block for `set_mode` / `reset`.
    pub fn trajectory_params(&self) -> TrajectoryParams {
        TrajectoryParams {
            reset_interval: self.trajectory.reset_interval_s,
            lissajous: self.lissajous,
            circular: self.circular,
            initial: self.initial_pose(),
        }
    }

    /// Serialize to pretty TOML (used to print a starter config).
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// One-line summary for the startup log.
    pub fn summary(&self) -> String {
        let p = self.initial_pose();
        format!(
            "object_name={} server={} rate={}Hz position=[{}, {}, {}] euler=[{}, {}, {}] mode={}",
            self.tracker.object_name,
            self.tracker.server_identifier,
            self.tracker.update_frequency_hz,
            p.position[0],
            p.position[1],
            p.position[2],
            p.euler_degrees[0],
            p.euler_degrees[1],
            p.euler_degrees[2],
            self.trajectory.mode
        )
    }
}

/// Sections also accepted under an older name.
const SECTION_ALIASES: &[(&str, &str)] = &[("tracker", "vicon")];

/// Rebuild a table from text that failed to parse as a whole.
fn recover_table(contents: &str) -> Table {
    let mut root = Table::new();
    let mut section: Option<String> = None;

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            section = header
                .strip_suffix(']')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());
            if section.is_none() {
                log::warn!(
                    "Config line {}: bad section header '{}'. Skipping section.",
                    index + 1,
                    line
                );
            }
            continue;
        }
        let Some(name) = &section else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            log::warn!(
                "Config line {}: expected key = value, got '{}'. Skipping.",
                index + 1,
                line
            );
            continue;
        };
        let key = key.trim().trim_matches('"');
        if key.is_empty() {
            continue;
        }
        if let Value::Table(table) = root
            .entry(name.clone())
            .or_insert(Value::Table(Table::new()))
        {
            table.insert(key.to_string(), recover_value(value.trim()));
        }
    }
    root
}

/// Parse one value as TOML, or take the raw text as a string.
fn recover_value(raw: &str) -> Value {
    let bare = || Value::String(raw.trim_matches('"').to_string());
    match format!("value = {}", raw).parse::<Table>() {
        Ok(mut table) => table.remove("value").unwrap_or_else(bare),
        Err(_) => bare(),
    }
}

/// Per-field TOML reader that keeps defaults on bad values.
struct FieldReader<'a> {
    root: &'a Table,
}

impl<'a> FieldReader<'a> {
    fn new(root: &'a Table) -> Self {
        Self { root }
    }

    /// Find the first present key among `keys` in `section`, then in the
    /// section's legacy name.
    fn lookup<'k>(&self, section: &str, keys: &[&'k str]) -> Option<(&'k str, &'a Value)> {
        let legacy = SECTION_ALIASES
            .iter()
            .filter(|(name, _)| *name == section)
            .map(|(_, alias)| *alias);
        std::iter::once(section).chain(legacy).find_map(|name| {
            let table = self.root.get(name)?.as_table()?;
            keys.iter().find_map(|key| table.get(*key).map(|value| (*key, value)))
        })
    }

    fn reject(section: &str, key: &str, value: &Value, expected: &str) {
        log::warn!(
            "Error parsing [{}] {}={}: expected {}. Keeping default.",
            section,
            key,
            value,
            expected
        );
    }

    fn f64(&self, section: &str, keys: &[&str], target: &mut f64) {
        let Some((key, value)) = self.lookup(section, keys) else {
            return;
        };
        let parsed = match value {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if v.is_finite() => *target = v,
            _ => Self::reject(section, key, value, "a finite number"),
        }
    }

    fn integer<'k>(
        &self,
        section: &str,
        keys: &[&'k str],
    ) -> Option<(&'k str, &'a Value, Option<i64>)> {
        let (key, value) = self.lookup(section, keys)?;
        let parsed = match value {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        Some((key, value, parsed))
    }

    fn u32(&self, section: &str, keys: &[&str], target: &mut u32) {
        let Some((key, value, parsed)) = self.integer(section, keys) else {
            return;
        };
        match parsed.and_then(|v| u32::try_from(v).ok()) {
            Some(v) => *target = v,
            None => Self::reject(section, key, value, "a non-negative integer"),
        }
    }

    /// Non-positive numbers fall back to `fallback`.
    fn positive_u32(&self, section: &str, keys: &[&str], target: &mut u32, fallback: u32) {
        let Some((key, value, parsed)) = self.integer(section, keys) else {
            return;
        };
        match parsed {
            Some(v) if v > 0 && v <= u32::MAX as i64 => *target = v as u32,
            Some(v) if v <= 0 => {
                log::warn!(
                    "Invalid [{}] {}={}. Using default {}.",
                    section,
                    key,
                    v,
                    fallback
                );
                *target = fallback;
            }
            _ => Self::reject(section, key, value, "a positive integer"),
        }
    }

    fn u16(&self, section: &str, keys: &[&str], target: &mut u16) {
        let Some((key, value, parsed)) = self.integer(section, keys) else {
            return;
        };
        match parsed.and_then(|v| u16::try_from(v).ok()) {
            Some(v) => *target = v,
            None => Self::reject(section, key, value, "a port number"),
        }
    }

    fn string(&self, section: &str, keys: &[&str], target: &mut String) {
        let Some((key, value)) = self.lookup(section, keys) else {
            return;
        };
        match value {
            Value::String(s) => *target = s.trim().to_string(),
            _ => Self::reject(section, key, value, "a string"),
        }
    }

    fn string_list(&self, section: &str, keys: &[&str], target: &mut Vec<String>) {
        let Some((key, value)) = self.lookup(section, keys) else {
            return;
        };
        let parsed: Option<Vec<String>> = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(|s| s.trim().to_string()))
                .collect(),
            Value::String(s) => Some(vec![s.trim().to_string()]),
            _ => None,
        };
        match parsed {
            Some(list) => *target = list,
            None => Self::reject(section, key, value, "a list of strings"),
        }
    }

    fn mode(&self, section: &str, keys: &[&str], target: &mut TrajectoryMode) {
        let Some((key, value)) = self.lookup(section, keys) else {
            return;
        };
        match value.as_str().and_then(TrajectoryMode::from_config) {
            Some(mode) => *target = mode,
            None => Self::reject(
                section,
                key,
                value,
                "one of static, lissajous, circular, kinematic_integration",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracker.object_name, "Origins");
        assert_eq!(config.tracker.server_identifier, "10.0.0.200");
        assert_eq!(config.tracker.update_frequency_hz, 200);
        assert_eq!(config.initial_pose().position, [1.0, -2.0, 1.5]);
        assert_eq!(config.initial_pose().euler_degrees, [0.0, 0.0, 0.0]);
        assert_eq!(config.trajectory.reset_interval_s, 120.0);
        assert_eq!(config.trajectory.mode, TrajectoryMode::Static);
        assert_eq!(config.lissajous, LissajousParams::default());
        assert_eq!(config.circular, CircularParams::default());
        assert_eq!(config.sink.port, 3883);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[tracker]
object_name = "Wand"
server_identifier = "127.0.0.1"
update_frequency_hz = 100

[position]
x = 0.5
y = 0
z = 2.25

[rotation]
yaw = 90.0
pitch = -10.0
roll = 5

[trajectory]
mode = "lissajous"
reset_interval_s = 30.0

[lissajous]
amplitude_x = 2.0
amplitude_y = 0.5
frequency_x = 3.0
frequency_y = 2.0
phase = 1.5707963

[circular]
radius = 0.8
speed = 0.25

[sink]
kind = "console"
port = 4000
destinations = ["127.0.0.1:5000"]
print_every = 0

[logging]
level = "debug"
"#;

        let config = Config::from_toml_str(toml_content);
        assert_eq!(config.tracker.object_name, "Wand");
        assert_eq!(config.tracker.server_identifier, "127.0.0.1");
        assert_eq!(config.tracker.update_frequency_hz, 100);
        assert_eq!(config.initial_pose().position, [0.5, 0.0, 2.25]);
        assert_eq!(config.initial_pose().euler_degrees, [90.0, -10.0, 5.0]);
        assert_eq!(config.trajectory.mode, TrajectoryMode::Lissajous);

        let params = config.trajectory_params();
        assert_eq!(params.reset_interval, 30.0);
        assert_eq!(params.lissajous.amplitude_x, 2.0);
        assert_eq!(params.lissajous.frequency_y, 2.0);
        assert_eq!(params.circular.radius, 0.8);
        assert_eq!(params.circular.speed, 0.25);

        assert_eq!(config.sink.kind, "console");
        assert_eq!(config.sink.port, 4000);
        assert_eq!(config.sink.destinations, vec!["127.0.0.1:5000".to_string()]);
        assert_eq!(config.sink.print_every, 0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_malformed_fields_keep_defaults() {
        let toml_content = r#"
[tracker]
object_name = 42
update_frequency_hz = "fast"

[position]
x = "not a number"
y = "3.5"
z = true

[rotation]
yaw = [1, 2]

[trajectory]
mode = "spiral"
"#;

        let config = Config::from_toml_str(toml_content);
        assert_eq!(config.tracker.object_name, "Origins");
        assert_eq!(config.tracker.update_frequency_hz, 200);
        // Numeric strings are accepted
        assert_eq!(config.initial_pose().position, [1.0, 3.5, 1.5]);
        assert_eq!(config.rotation.yaw, 0.0);
        assert_eq!(config.trajectory.mode, TrajectoryMode::Static);
    }

    #[test]
    fn test_legacy_key_aliases() {
        let toml_content = r#"
[tracker]
server_ip = "192.168.1.10"
frequency = 50

[position]
x1 = 4.0
x2 = 5.0
x3 = 6.0
"#;

        let config = Config::from_toml_str(toml_content);
        assert_eq!(config.tracker.server_identifier, "192.168.1.10");
        assert_eq!(config.tracker.update_frequency_hz, 50);
        assert_eq!(config.initial_pose().position, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_validation_repairs() {
        let toml_content = r#"
[tracker]
server_identifier = "   "
update_frequency_hz = -5

[trajectory]
reset_interval_s = 0.0
"#;

        let config = Config::from_toml_str(toml_content);
        assert_eq!(config.tracker.server_identifier, "10.0.0.200");
        assert_eq!(config.tracker.update_frequency_hz, 200);
        assert_eq!(config.trajectory.reset_interval_s, 120.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_line_keeps_valid_fields() {
        let config =
            Config::from_toml_str("[tracker]\nobject_name = Wand\n\n[position]\nx = 4.0\n");
        assert_eq!(config.tracker.object_name, "Wand");
        assert_eq!(config.position.x, 4.0);
        assert_eq!(config.position.y, -2.0);

        let config = Config::from_toml_str(
            "[tracker]\nupdate_frequency_hz = 100\nnot a setting\n\n[rotation]\nyaw = 45 degrees\npitch = 10\n",
        );
        assert_eq!(config.tracker.update_frequency_hz, 100);
        // Bare words become strings, and a non-numeric string keeps the default
        assert_eq!(config.rotation.yaw, 0.0);
        assert_eq!(config.rotation.pitch, 10.0);
    }

    #[test]
    fn test_unparseable_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tracker").unwrap();
        writeln!(file, "object_name = \"Lost\"").unwrap();
        assert_eq!(Config::load(file.path()), Config::default());
    }

    #[test]
    fn test_vicon_section_is_tracker() {
        let config =
            Config::from_toml_str("[vicon]\nserver_ip = \"192.168.1.10\"\nfrequency = 50\n");
        assert_eq!(config.tracker.server_identifier, "192.168.1.10");
        assert_eq!(config.tracker.update_frequency_hz, 50);

        let config = Config::from_toml_str(
            "[tracker]\nobject_name = \"New\"\n\n[vicon]\nobject_name = \"Old\"\nfrequency = 50\n",
        );
        assert_eq!(config.tracker.object_name, "New");
        assert_eq!(config.tracker.update_frequency_hz, 50);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");

        let mut config = Config::default();
        config.tracker.object_name = "Drone".to_string();
        config.trajectory.mode = TrajectoryMode::Circular;
        config.circular.radius = 3.0;
        config.sink.destinations = vec!["127.0.0.1:9000".to_string()];
        config.to_file(&path).unwrap();

        let loaded = Config::load(&path);
        assert_eq!(loaded, config);
    }
}
