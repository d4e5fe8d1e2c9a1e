//! Parsing of `/proc/<pid>/stat`.
//!
//! The second field is the executable name in parentheses and may itself
//! contain spaces and parentheses, so it is delimited by the first `(` and
//! the last `)`. See `proc_pid_stat(5)` for the remaining fields.

use super::StatParseError;
use super::parser::SingleLineStat;

/// Indices into the fields following the closing parenthesis of the name.
const PPID: usize = 1;
const UTIME: usize = 11;
const STIME: usize = 12;
const RSS: usize = 21;

/// The fields of `/proc/<pid>/stat` the sampler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcStat {
    pub name: String,
    pub ppid: u32,
    /// Time scheduled in user mode, in clock ticks.
    pub utime: u64,
    /// Time scheduled in kernel mode, in clock ticks.
    pub stime: u64,
    /// Resident set size in pages.
    pub rss_pages: u64,
}

impl ProcStat {
    /// Total CPU time consumed in clock ticks.
    pub fn cpu_ticks(&self) -> u64 {
        self.utime.saturating_add(self.stime)
    }
}

impl SingleLineStat for ProcStat {
    fn parse(line: &str) -> Result<Self, StatParseError> {
        let open = line.find('(').ok_or(StatParseError::MalformedName)?;
        let close = line.rfind(')').ok_or(StatParseError::MalformedName)?;
        if close <= open {
            return Err(StatParseError::MalformedName);
        }

        let name = line[open + 1..close].to_owned();
        let fields: Vec<&str> = line[close + 1..].split_whitespace().collect();

        Ok(Self {
            name,
            ppid: parse_field(&fields, PPID, "ppid")?,
            utime: parse_field(&fields, UTIME, "utime")?,
            stime: parse_field(&fields, STIME, "stime")?,
            rss_pages: parse_field(&fields, RSS, "rss")?,
        })
    }
}

fn parse_field<T>(fields: &[&str], index: usize, field: &'static str) -> Result<T, StatParseError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    let value = fields
        .get(index)
        .ok_or(StatParseError::MissingField(field))?;
    value.parse().map_err(|source| StatParseError::InvalidValue {
        field,
        value: (*value).to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "4242 (nginx: worker) S 4200 4200 4200 0 -1 4194624 1017 0 0 0 \
                          150 25 0 0 20 0 1 0 123456 104857600 2560 18446744073709551615";

    #[test]
    fn test_parse_stat_line() {
        let stat = ProcStat::parse(SAMPLE).unwrap();
        assert_eq!(stat.name, "nginx: worker");
        assert_eq!(stat.ppid, 4200);
        assert_eq!(stat.utime, 150);
        assert_eq!(stat.stime, 25);
        assert_eq!(stat.cpu_ticks(), 175);
        assert_eq!(stat.rss_pages, 2560);
    }

    #[test]
    fn test_parse_name_with_parentheses() {
        let line = SAMPLE.replace("(nginx: worker)", "((sd-pam) x)");
        let stat = ProcStat::parse(&line).unwrap();
        assert_eq!(stat.name, "(sd-pam) x");
        assert_eq!(stat.ppid, 4200);
    }

    #[test]
    fn test_parse_from_reader() {
        let data = format!("{SAMPLE}\n");
        let stat = ProcStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.rss_pages, 2560);
    }

    #[test]
    fn test_parse_missing_name() {
        assert!(matches!(
            ProcStat::parse("4242 nginx S 1").unwrap_err(),
            StatParseError::MalformedName
        ));
    }

    #[test]
    fn test_parse_truncated_line() {
        assert!(matches!(
            ProcStat::parse("4242 (nginx) S 1 2 3").unwrap_err(),
            StatParseError::MissingField("utime")
        ));
    }

    #[test]
    fn test_parse_invalid_number() {
        let line = SAMPLE.replace(" 150 ", " x150 ");
        match ProcStat::parse(&line).unwrap_err() {
            StatParseError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "utime");
                assert_eq!(value, "x150");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
