use std::str::FromStr;

/// Selects which source lines a tracer will report on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TracingConfig {
    All,
    Between(usize, usize),
    Before(usize),
    After(usize),
    Only(usize),
    Off,
}

impl TracingConfig {
    /// Returns `true` if a trace event that happens on `line` should be printed.
    pub fn traces(&self, line: usize) -> bool {
        match *self {
            TracingConfig::Only(ln) => line == ln,
            TracingConfig::Before(ln) => line <= ln,
            TracingConfig::After(ln) => line >= ln,
            TracingConfig::Between(start, end) => line >= start && line <= end,
            TracingConfig::All => true,
            TracingConfig::Off => false,
        }
    }
}

/**
Parses the tracing argument given on the command line:

* `all` traces every line
* `off` disables tracing
* `N` traces only line N
* `N-M` traces lines N through M
* `-N` traces every line up to and including N
* `N-` traces every line from N onward
 */
impl FromStr for TracingConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |n: &str| {
            n.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid line number in trace range: {}", s))
        };

        match s.trim() {
            "all" => Ok(TracingConfig::All),
            "off" => Ok(TracingConfig::Off),
            range => match range.split_once('-') {
                None => Ok(TracingConfig::Only(parse(range)?)),
                Some(("", end)) => Ok(TracingConfig::Before(parse(end)?)),
                Some((start, "")) => Ok(TracingConfig::After(parse(start)?)),
                Some((start, end)) => Ok(TracingConfig::Between(parse(start)?, parse(end)?)),
            },
        }
    }
}

pub trait Tracing {
    fn set_tracing(&mut self, config: TracingConfig);
}
