/// Reads a line based config format: a key followed by whitespace separated parameters. Lines
/// starting with `;` are comments.
pub struct ConfigFile<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

/// A single non-empty, non-comment line.
#[derive(Debug, PartialEq)]
pub struct ConfigLine<'a> {
    /// 1-based line number in the source.
    pub number: usize,
    pub key: &'a str,
    pub params: Vec<&'a str>,
}

/// Splits a line into tokens. Quoted strings are treated as a single token (without quotes).
/// Non-whitespace sequences are considered tokens outside of strings.
fn split_line(line: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut in_string = false;
    let mut token_start: Option<usize> = None;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => {
                if in_string {
                    // End of quoted string
                    if let Some(start) = token_start {
                        result.push(&line[start..i]);
                        token_start = None;
                    }
                    in_string = false;
                } else {
                    // Start of quoted string (skip quote)
                    in_string = true;
                    token_start = Some(i + 1);
                }
            }

            ch if ch.is_whitespace() => {
                if !in_string {
                    if let Some(start) = token_start {
                        result.push(&line[start..i]);
                        token_start = None;
                    }
                }
            }

            _ => {
                if token_start.is_none() {
                    token_start = Some(i);
                }
            }
        }
    }

    // Handle final token
    if let Some(start) = token_start {
        result.push(&line[start..]);
    }

    result
}

impl<'a> ConfigFile<'a> {
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for ConfigFile<'a> {
    type Item = ConfigLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, line) = self.lines.next()?;
            let tokens = split_line(line);

            let Some((key, params)) = tokens.split_first() else {
                continue;
            };
            if key.starts_with(';') {
                continue;
            }

            return Some(ConfigLine {
                number: index + 1,
                key: *key,
                params: params.to_vec(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        assert_eq!(split_line("one"), vec!["one"]);
        assert_eq!(split_line("one two"), vec!["one", "two"]);
        assert_eq!(split_line("one two three"), vec!["one", "two", "three"]);
        assert_eq!(split_line("one    two"), vec!["one", "two"]);
        assert_eq!(split_line("one\t\ttwo"), vec!["one", "two"]);
        assert_eq!(split_line("one \"two three\""), vec!["one", "two three"]);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let data = "; a comment\n\nSEGMENT_HEIGHT 5\n   \n;SEGMENT_COUNT 2\nSWING 0 cos 90 3\n";
        let lines: Vec<ConfigLine> = ConfigFile::new(data).collect();

        assert_eq!(
            lines,
            vec![
                ConfigLine {
                    number: 3,
                    key: "SEGMENT_HEIGHT",
                    params: vec!["5"],
                },
                ConfigLine {
                    number: 6,
                    key: "SWING",
                    params: vec!["0", "cos", "90", "3"],
                },
            ]
        );
    }
}
