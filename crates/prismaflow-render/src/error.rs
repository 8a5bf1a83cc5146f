pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to start Graphviz `{program}`: {source}")]
    GraphvizSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Graphviz `{program}` exited with {status}: {stderr}")]
    GraphvizFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Graphviz produced non-UTF-8 output: {0}")]
    GraphvizOutput(#[from] std::string::FromUtf8Error),

    #[error("I/O error while talking to Graphviz: {0}")]
    Io(#[from] std::io::Error),

    #[error("SVG rewrite failed: {message}")]
    Rewrite { message: String },
}
