/// Release channels
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Channel {
    /// Tags without a pre-release marker
    #[default]
    Stable,
    Beta,
    Alpha,
    /// Tags containing "rc"
    #[value(name = "rc")]
    ReleaseCandidate,
}

impl Channel {
    /// Channel a tag belongs to, judged by its pre-release marker.
    ///
    /// ```
    /// use panel::update::Channel;
    ///
    /// assert_eq!(Channel::from_version("v5.1.0"), Channel::Stable);
    /// assert_eq!(Channel::from_version("5.1.0-RC.2"), Channel::ReleaseCandidate);
    /// ```
    pub fn from_version(version: &str) -> Self {
        let Some((_, pre)) = version.split_once('-') else {
            return Channel::Stable;
        };
        let pre = pre.to_lowercase();
        if pre.contains("alpha") {
            Channel::Alpha
        } else if pre.contains("beta") {
            Channel::Beta
        } else if pre.contains("rc") {
            Channel::ReleaseCandidate
        } else {
            Channel::Stable
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Alpha => "alpha",
            Channel::ReleaseCandidate => "rc",
        };
        f.write_str(name)
    }
}
