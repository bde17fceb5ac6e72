use tavern_core::error::CoreError;

/// Errors surfaced by slash-command handlers.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("This command can only be used in a server")]
    GuildOnly,

    #[error("Missing required option '{0}'")]
    MissingOption(String),

    #[error("You have no character named '{0}'")]
    UnknownCharacter(String),
}

impl BotError {
    /// Text shown to the invoking user.
    ///
    /// Domain errors are shown as-is; infrastructure errors are replaced by
    /// a generic message and should be logged by the caller.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Core(CoreError::Internal(_)) | BotError::Database(_) => {
                "Something went wrong while processing that command. Please try again.".to_string()
            }
            BotError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} {id} was not found.")
            }
            BotError::Core(CoreError::Validation(msg))
            | BotError::Core(CoreError::Conflict(msg))
            | BotError::Core(CoreError::Configuration(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the error reflects a fault on our side rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, BotError::Core(CoreError::Internal(_)) | BotError::Database(_))
    }
}
