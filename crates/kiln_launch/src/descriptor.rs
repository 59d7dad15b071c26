//! Launch descriptors: everything needed to start a produced binary.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// How the launched process's standard streams are wired.
#[derive(Debug, Clone)]
pub enum IoChannels {
    /// The process inherits the supervisor's streams.
    Inherit,
    /// stdout/stderr are routed through named pipes under `channel_dir`
    /// so they can be consumed incrementally as they are produced.
    Capture {
        /// Directory the named pipes are created in. Created if missing;
        /// stale pipes from a previous launch are replaced.
        channel_dir: PathBuf,
    },
}

/// A complete description of one process launch.
///
/// Produced at the end of a successful build session and consumed exactly
/// once by the supervisor.
#[derive(Debug, Clone)]
pub struct LaunchDescriptor {
    /// The binary to run.
    pub binary: PathBuf,
    /// Argument vector, already split.
    pub args: Vec<String>,
    /// Environment variables set for the process, on top of the inherited
    /// environment.
    pub env: BTreeMap<String, String>,
    /// Working directory, when different from the supervisor's.
    pub working_dir: Option<PathBuf>,
    /// Standard-stream wiring.
    pub io: IoChannels,
}

impl LaunchDescriptor {
    /// Creates a descriptor that runs `binary` with inherited streams.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            working_dir: None,
            io: IoChannels::Inherit,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments from a shell-style string, honoring quotes.
    pub fn args_str(mut self, args: &str) -> Self {
        self.args.extend(split_args(args));
        self
    }

    /// Sets one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Routes stdout/stderr through named pipes under `channel_dir`.
    pub fn capture_output(mut self, channel_dir: impl Into<PathBuf>) -> Self {
        self.io = IoChannels::Capture {
            channel_dir: channel_dir.into(),
        };
        self
    }
}

/// Splits a shell-style argument string on whitespace, honoring single and
/// double quotes.
///
/// Quotes group characters (including whitespace) into one argument and are
/// stripped from the result. An unterminated quote runs to the end of the
/// string. Empty input yields no arguments.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_arg = true;
                }
                c if c.is_whitespace() => {
                    if in_arg {
                        args.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                c => {
                    current.push(c);
                    in_arg = true;
                }
            },
        }
    }
    if in_arg {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split_args("-Xmx512m -verbose"), vec!["-Xmx512m", "-verbose"]);
    }

    #[test]
    fn empty_input_is_no_args() {
        assert!(split_args("").is_empty());
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn double_quotes_group() {
        assert_eq!(
            split_args(r#"-Dname="two words" plain"#),
            vec!["-Dname=two words", "plain"]
        );
    }

    #[test]
    fn single_quotes_group() {
        assert_eq!(split_args("'a b' c"), vec!["a b", "c"]);
    }

    #[test]
    fn quote_inside_other_quote_is_literal() {
        assert_eq!(split_args(r#"'say "hi"'"#), vec![r#"say "hi""#]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(split_args("'a b"), vec!["a b"]);
    }

    #[test]
    fn builder_collects_settings() {
        let d = LaunchDescriptor::new("/out/app")
            .arg("--serve")
            .args_str("-a -b")
            .env("PORT", "8080")
            .working_dir("/proj");
        assert_eq!(d.args, vec!["--serve", "-a", "-b"]);
        assert_eq!(d.env.get("PORT").map(String::as_str), Some("8080"));
        assert!(matches!(d.io, IoChannels::Inherit));
    }
}
