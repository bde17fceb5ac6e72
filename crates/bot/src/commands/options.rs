//! Owned view of slash-command options.
//!
//! Serenity hands options out as borrowed [`ResolvedOption`]s; handlers take
//! [`CommandArgs`] instead so they can be exercised without an interaction.

use serenity::all::{ResolvedOption, ResolvedValue};
use tavern_core::types::DiscordId;

use crate::error::BotError;

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Channel(DiscordId),
}

/// Named option values for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    values: Vec<(String, ArgValue)>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and by [`CommandArgs::from_resolved`].
    pub fn with(mut self, name: &str, value: ArgValue) -> Self {
        self.values.push((name.to_string(), value));
        self
    }

    /// Convert serenity's resolved options, dropping kinds no command uses.
    pub fn from_resolved(options: &[ResolvedOption<'_>]) -> Self {
        options.iter().fold(Self::new(), |args, option| {
            let value = match &option.value {
                ResolvedValue::String(s) => ArgValue::Str((*s).to_string()),
                ResolvedValue::Integer(i) => ArgValue::Int(*i),
                ResolvedValue::Boolean(b) => ArgValue::Bool(*b),
                ResolvedValue::Channel(channel) => ArgValue::Channel(channel.id.get() as DiscordId),
                _ => return args,
            };
            args.with(option.name, value)
        })
    }

    fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ArgValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ArgValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ArgValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<DiscordId> {
        match self.get(name) {
            Some(ArgValue::Channel(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn required_str(&self, name: &str) -> Result<&str, BotError> {
        self.str(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }

    pub fn required_int(&self, name: &str) -> Result<i64, BotError> {
        self.int(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }

    pub fn required_bool(&self, name: &str) -> Result<bool, BotError> {
        self.bool(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }

    pub fn required_channel(&self, name: &str) -> Result<DiscordId, BotError> {
        self.channel(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }
}
