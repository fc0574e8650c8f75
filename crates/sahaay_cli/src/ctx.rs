use sahaay_config::Config;

/// State shared by every command.
pub(crate) struct Ctx {
    pub(crate) config: Config,

    /// Whether stdout is a terminal, and output may be styled.
    pub(crate) is_tty: bool,
}

impl Ctx {
    pub(crate) fn new(config: Config, is_tty: bool) -> Self {
        Self { config, is_tty }
    }
}
