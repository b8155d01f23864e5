//! Bot command menus.
//!
//! A [`CommandMenu`] is the list of commands shown to users of one language.
//! Menus are validated when built and published through
//! [`MessagingChannel::set_commands`] when the runtime starts.
//!
//! ```rust,ignore
//! let menu = CommandMenu::new("en")
//!     .command("/counter", "Show the counter")?
//!     .command("phone", "Enter a phone number")?;
//! ```

use switchyard_core::{BotCommand, ChannelResult, MessagingChannel};
use tracing::info;

use crate::error::MenuError;

const MAX_NAME_LEN: usize = 32;
const MIN_DESCRIPTION_LEN: usize = 3;
const MAX_DESCRIPTION_LEN: usize = 256;

/// The command menu of one language; `""` is the default language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMenu {
    language: String,
    commands: Vec<BotCommand>,
}

impl CommandMenu {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            commands: Vec::new(),
        }
    }

    /// Adds a command. A leading `/` on the name is stripped.
    pub fn command(
        mut self,
        name: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Result<Self, MenuError> {
        let name = name.as_ref();
        let name = name.strip_prefix('/').unwrap_or(name);
        if !is_valid_name(name) {
            return Err(MenuError::InvalidName(name.to_string()));
        }

        let description = description.into();
        let len = description.chars().count();
        if !(MIN_DESCRIPTION_LEN..=MAX_DESCRIPTION_LEN).contains(&len) {
            return Err(MenuError::InvalidDescription(name.to_string()));
        }

        if self.commands.iter().any(|c| c.command == name) {
            return Err(MenuError::Duplicate(name.to_string()));
        }

        self.commands.push(BotCommand {
            command: name.to_string(),
            description,
        });
        Ok(self)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn commands(&self) -> &[BotCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Publishes the menu through the channel.
    pub async fn publish(&self, channel: &dyn MessagingChannel) -> ChannelResult<()> {
        channel.set_commands(&self.language, &self.commands).await?;
        info!(
            language = %self.language,
            count = self.commands.len(),
            "Published command menu"
        );
        Ok(())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
