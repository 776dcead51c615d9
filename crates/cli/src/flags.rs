use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SourceKind {
    /// http(s) URLs fetch over the network, anything else is a directory
    Auto,
    Dir,
    Http,
}

impl SourceKind {
    pub(crate) fn resolve(self, source: &str) -> SourceKind {
        match self {
            SourceKind::Auto => {
                let lower = source.trim().to_ascii_lowercase();
                if lower.starts_with("http://") || lower.starts_with("https://") {
                    SourceKind::Http
                } else {
                    SourceKind::Dir
                }
            }
            other => other,
        }
    }
}
