//! Queue record lines and the pure lane-editing operations.
//!
//! Wire format of one record:
//! ```text
//! <client identity>\t<payload>\n
//! ```
//!
//! A lane is simply the concatenation of such lines.  The functions here take
//! the current lane text and return the new lane text; locking and storage
//! are the caller's business.
//!
//! Only complete lines (ending in `\n`) are ever considered.  A trailing
//! fragment without a terminator is assumed to be a write in progress and is
//! left exactly where it is.

/// One line of a queue lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    /// Identity tag of the client the record belongs to.
    pub identity: String,
    /// Serialized request or response.
    pub payload: String,
}

impl QueueRecord {
    /// Creates a record.
    pub fn new(identity: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            payload: payload.into(),
        }
    }

    /// Parses one line (without its `\n`).
    ///
    /// Returns `None` for a line with no tab separator or an empty identity.
    pub fn parse(line: &str) -> Option<Self> {
        let (identity, payload) = line.split_once('\t')?;
        if identity.is_empty() {
            return None;
        }
        Some(Self::new(identity, payload))
    }

    /// Renders the record as a terminated line.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.identity.len() + self.payload.len() + 2);
        line.push_str(&self.identity);
        line.push('\t');
        line.push_str(self.payload.trim_end_matches('\n'));
        line.push('\n');
        line
    }
}

/// Returns `lane` with `record` appended as a new terminated line.
///
/// If `lane` does not end in a newline, one is inserted first so the new
/// record never merges with the previous one.
pub fn append_record(lane: &str, record: &QueueRecord) -> String {
    let line = record.to_line();
    let mut out = String::with_capacity(lane.len() + line.len() + 1);
    out.push_str(lane);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&line);
    out
}

/// Finds the first complete line tagged with `identity` and removes it.
///
/// Returns the payload and the remaining lane text, or `None` if no line
/// belongs to `identity`.  All other lines are kept in their original order.
pub fn extract_record(lane: &str, identity: &str) -> Option<(String, String)> {
    let mut offset = 0;
    for line in lane.split_inclusive('\n') {
        let Some(body) = line.strip_suffix('\n') else {
            break;
        };
        if let Some(record) = QueueRecord::parse(body) {
            if record.identity == identity {
                let mut remaining = String::with_capacity(lane.len() - line.len());
                remaining.push_str(&lane[..offset]);
                remaining.push_str(&lane[offset + line.len()..]);
                return Some((record.payload, remaining));
            }
        }
        offset += line.len();
    }
    None
}

/// Removes every complete line from `lane`.
///
/// Returns the parsed records in lane order and the leftover text (an
/// unterminated trailing fragment, if any).  Lines that do not parse are
/// dropped.
pub fn take_all_records(lane: &str) -> (Vec<QueueRecord>, String) {
    let mut records = Vec::new();
    let mut consumed = 0;
    for line in lane.split_inclusive('\n') {
        let Some(body) = line.strip_suffix('\n') else {
            break;
        };
        if let Some(record) = QueueRecord::parse(body) {
            records.push(record);
        }
        consumed += line.len();
    }
    (records, lane[consumed..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: &str = "11111111-1111-4111-8111-111111111111";
    const OTHER: &str = "22222222-2222-4222-8222-222222222222";

    fn line(identity: &str, payload: &str) -> String {
        QueueRecord::new(identity, payload).to_line()
    }

    #[test]
    fn test_to_line_is_tab_separated_and_terminated() {
        let record = QueueRecord::new(ME, "{}");
        assert_eq!(record.to_line(), format!("{ME}\t{{}}\n"));
    }

    #[test]
    fn test_parse_rejects_line_without_tab() {
        assert_eq!(QueueRecord::parse("no separator here"), None);
        assert_eq!(QueueRecord::parse("\tpayload"), None);
    }

    #[test]
    fn test_append_to_empty_lane() {
        let lane = append_record("", &QueueRecord::new(ME, "a"));
        assert_eq!(lane, line(ME, "a"));
    }

    #[test]
    fn test_append_repairs_missing_terminator() {
        // Arrange
        let lane = format!("{OTHER}\tx");

        // Act
        let out = append_record(&lane, &QueueRecord::new(ME, "y"));

        // Assert
        assert_eq!(out, format!("{OTHER}\tx\n{ME}\ty\n"));
    }

    #[test]
    fn test_extract_returns_first_matching_line_only() {
        // Arrange
        let lane = [line(OTHER, "o1"), line(ME, "m1"), line(OTHER, "o2"), line(ME, "m2")].concat();

        // Act
        let (payload, remaining) = extract_record(&lane, ME).unwrap();

        // Assert
        assert_eq!(payload, "m1");
        assert_eq!(remaining, [line(OTHER, "o1"), line(OTHER, "o2"), line(ME, "m2")].concat());
    }

    #[test]
    fn test_extract_never_touches_other_identities() {
        // Arrange
        let lane = [line(OTHER, "o1"), line(OTHER, "o2")].concat();

        // Act
        let result = extract_record(&lane, ME);

        // Assert
        assert_eq!(result, None);
    }

    #[test]
    fn test_extract_ignores_unterminated_trailing_fragment() {
        let lane = format!("{}{ME}\tpartial", line(OTHER, "o1"));
        assert_eq!(extract_record(&lane, ME), None);
    }

    #[test]
    fn test_extract_requires_exact_identity_match() {
        // Arrange – identity that is a prefix of the stored one must not match
        let lane = line(&format!("{ME}x"), "nope");

        // Act / Assert
        assert_eq!(extract_record(&lane, ME), None);
    }

    #[test]
    fn test_extract_skips_garbage_lines() {
        let lane = format!("garbage\n{}", line(ME, "ok"));
        let (payload, remaining) = extract_record(&lane, ME).unwrap();
        assert_eq!(payload, "ok");
        assert_eq!(remaining, "garbage\n");
    }

    #[test]
    fn test_take_all_records_keeps_trailing_fragment() {
        // Arrange
        let lane = format!("{}{}{OTHER}\tin-progress", line(ME, "a"), line(OTHER, "b"));

        // Act
        let (records, leftover) = take_all_records(&lane);

        // Assert
        assert_eq!(
            records,
            vec![QueueRecord::new(ME, "a"), QueueRecord::new(OTHER, "b")]
        );
        assert_eq!(leftover, format!("{OTHER}\tin-progress"));
    }
}
