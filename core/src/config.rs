use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use uci::{UciInput, UciOption, UciOptionType};

use crate::backend::{BackendProfile, BackendVariant};

/// Quiet period after the last position change before analysis starts.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(20);

/// How long to wait for `uciok` before probing readiness anyway.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which backends an option is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Always,
    Threads,
    Wdl,
}

impl Capability {
    fn supported_by(self, profile: &BackendProfile) -> bool {
        match self {
            Capability::Always => true,
            Capability::Threads => profile.supports_threads,
            Capability::Wdl => profile.supports_wdl,
        }
    }
}

macro_rules! define_options {
    ($(($field:ident: $type:ty, $uci_name:literal, $uci_type:expr, $default:expr, $capability:expr)),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub struct EngineOptions {
            $(pub $field: ConfigParam<$type>,)*
        }

        impl Default for EngineOptions {
            fn default() -> Self {
                Self {
                    $($field: ConfigParam {
                        value: $default,
                        uci: UciOption { name: $uci_name, option_type: $uci_type },
                        capability: $capability,
                    },)*
                }
            }
        }

        impl EngineOptions {
            pub fn update(&mut self, uci_name: &str, value: &str) -> Result<(), String> {
                match uci_name {
                    $($uci_name => self.$field.update(value),)*
                    _ => Err(format!("Unknown option: {}", uci_name)),
                }
            }

            /// `setoption` commands for every option the backend supports, in declaration order.
            pub fn commands_for(&self, profile: &BackendProfile) -> Vec<UciInput> {
                let mut commands = Vec::new();
                $(
                    if self.$field.capability.supported_by(profile) {
                        match self.$field.to_setoption() {
                            Ok(command) => commands.push(command),
                            Err(e) => warn!("Skipping option {}: {}", $uci_name, e),
                        }
                    }
                )*
                commands
            }
        }
    };
}

define_options!(
    (hash_size: u32, "Hash", UciOptionType::Spin { min: 1, max: 33_554_432 }, 32, Capability::Always),
    (threads: u32, "Threads", UciOptionType::Spin { min: 1, max: 1024 }, default_threads(), Capability::Threads),
    (show_wdl: bool, "UCI_ShowWDL", UciOptionType::Check, true, Capability::Wdl),
);

/// Leave one core for the UI.
fn default_threads() -> u32 {
    num_cpus::get().saturating_sub(1).max(1) as u32
}

impl EngineOptions {
    /// The option values a backend ends up with once `commands_for` has been sent.
    pub fn applied_for(&self, profile: &BackendProfile) -> AppliedOptions {
        let pick = |capability: Capability| capability.supported_by(profile);

        AppliedOptions {
            hash_size: pick(self.hash_size.capability).then_some(self.hash_size.value),
            threads: pick(self.threads.capability).then_some(self.threads.value),
            show_wdl: pick(self.show_wdl.capability).then_some(self.show_wdl.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedOptions {
    pub hash_size: Option<u32>,
    pub threads: Option<u32>,
    pub show_wdl: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ConfigParam<T> {
    pub value: T,
    pub uci: UciOption,
    pub capability: Capability,
}

impl<T> ConfigParam<T>
where
    T: FromStr + ToString + Clone,
    T::Err: std::fmt::Display,
{
    pub fn update(&mut self, value: &str) -> Result<(), String> {
        self.uci.option_type.validate(value)?;

        let new_value = value
            .parse::<T>()
            .map_err(|e| format!("Parse error: {}", e))?;

        self.value = new_value;
        Ok(())
    }

    pub fn to_setoption(&self) -> Result<UciInput, String> {
        self.uci.to_setoption(&self.value)
    }
}

/// Everything the coordinator needs to know before the first event arrives.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendVariant,
    pub engine_path: PathBuf,
    pub engine_args: Vec<String>,
    pub remote_address: String,
    pub debounce: Duration,
    pub handshake_timeout: Duration,
    pub options: EngineOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendVariant::Local,
            engine_path: PathBuf::from("stockfish"),
            engine_args: Vec::new(),
            remote_address: "127.0.0.1:9999".to_string(),
            debounce: DEBOUNCE_DELAY,
            handshake_timeout: HANDSHAKE_TIMEOUT,
            options: EngineOptions::default(),
        }
    }
}
