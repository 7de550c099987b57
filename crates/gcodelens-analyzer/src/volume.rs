//! Per-object bounding-box volume analysis
//!
//! Slicers bracket each printed object with comment markers:
//!
//! ```text
//! ; printing object Benchy id:0 copy 0
//! G1 X10.2 Y20.1 Z0.2 E0.5
//! ...
//! ; stop printing object Benchy id:0 copy 0
//! ```
//!
//! The scanner is a two-state automaton (`Idle`, `InObject(name)`). While an
//! object is open, every `G1` line carrying explicit X, Y and Z values grows
//! that object's bounding box. The box volumes are a rough proxy for each
//! object's share of the job's material and energy.
//!
//! Marker handling is loose:
//! - a start marker while an object is open switches to the new name (no nesting)
//! - a stop marker closes whatever is open, whatever name it carries
//! - a stop marker while idle does nothing
//! - a start marker with a blank name closes the open object
//! - lines that move fewer than three axes are ignored

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use gcodelens_core::{BoundingBox, Document, Point3, VolumeReport};

fn object_start_regex() -> &'static Regex {
    static START_REGEX: OnceLock<Regex> = OnceLock::new();
    START_REGEX
        .get_or_init(|| Regex::new(r"^; printing object (.*)").expect("invalid regex pattern"))
}

fn object_stop_regex() -> &'static Regex {
    static STOP_REGEX: OnceLock<Regex> = OnceLock::new();
    STOP_REGEX
        .get_or_init(|| Regex::new(r"^; stop printing object ").expect("invalid regex pattern"))
}

// Unanchored at the end: anything after the Z field is ignored.
fn linear_move_regex() -> &'static Regex {
    static MOVE_REGEX: OnceLock<Regex> = OnceLock::new();
    MOVE_REGEX.get_or_init(|| {
        Regex::new(r"^G1 .*?X([\d.]+) .*?Y([\d.]+) .*?Z([\d.]+)").expect("invalid regex pattern")
    })
}

/// What a single document line means to the scanner
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent<'a> {
    /// `; printing object <name>`; carries the trimmed name
    ObjectStart(&'a str),
    /// `; stop printing object <name>`; the name is not inspected
    ObjectStop,
    /// `G1` with explicit X, Y and Z values
    Move(Point3),
    /// A `G1` line whose X/Y/Z fields matched but did not parse as numbers
    MalformedMove,
    /// Anything else
    Other,
}

impl<'a> LineEvent<'a> {
    /// Classify one line
    pub fn classify(line: &'a str) -> Self {
        if let Some(caps) = object_start_regex().captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str()).trim();
            return Self::ObjectStart(name);
        }

        if object_stop_regex().is_match(line) {
            return Self::ObjectStop;
        }

        let Some(caps) = linear_move_regex().captures(line) else {
            return Self::Other;
        };

        let axis = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
        match (axis(1), axis(2), axis(3)) {
            (Some(x), Some(y), Some(z)) => Self::Move(Point3::new(x, y, z)),
            _ => Self::MalformedMove,
        }
    }
}

/// Scanner state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Outside any object; moves are ignored
    #[default]
    Idle,
    /// Inside the named object; moves grow its bounding box
    InObject(String),
}

impl ScanState {
    /// The open object's name, if any
    pub fn current_object(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::InObject(name) => Some(name.as_str()),
        }
    }
}

/// Final extent of one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExtent {
    pub name: String,
    pub bounding_box: BoundingBox,
}

impl ObjectExtent {
    /// Bounding-box volume, 0 when degenerate on any axis
    pub fn volume(&self) -> f64 {
        self.bounding_box.volume()
    }
}

/// Completed scan of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectScan {
    /// Objects in order of their first accepted move
    pub objects: Vec<ObjectExtent>,
    /// Move lines skipped inside objects because a field failed to parse
    pub skipped_lines: usize,
}

impl ObjectScan {
    /// Look up an object by name
    pub fn get(&self, name: &str) -> Option<&ObjectExtent> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Sum of all object volumes
    pub fn total_volume(&self) -> f64 {
        self.objects.iter().map(ObjectExtent::volume).sum()
    }

    /// Derive the per-object volume report; `None` if the total is zero
    pub fn report(&self) -> Option<VolumeReport> {
        VolumeReport::from_volumes(
            self.objects
                .iter()
                .map(|o| (o.name.clone(), o.volume())),
        )
    }
}

/// Insertion-ordered name -> bounding box table, owned by one scan
#[derive(Debug, Default)]
struct ExtentTable {
    extents: Vec<ObjectExtent>,
    index: HashMap<String, usize>,
}

impl ExtentTable {
    fn extend(&mut self, name: &str, point: Point3) {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.extents.push(ObjectExtent {
                    name: name.to_string(),
                    bounding_box: BoundingBox::empty(),
                });
                self.index.insert(name.to_string(), self.extents.len() - 1);
                self.extents.len() - 1
            }
        };
        self.extents[slot].bounding_box.extend(point);
    }
}

#[derive(Debug, Default)]
struct Scanner {
    state: ScanState,
    table: ExtentTable,
    skipped_lines: usize,
}

impl Scanner {
    fn step(&mut self, line_number: usize, event: LineEvent<'_>) {
        let state = std::mem::take(&mut self.state);

        self.state = match (state, event) {
            (_, LineEvent::ObjectStart("")) => ScanState::Idle,
            (_, LineEvent::ObjectStart(name)) => ScanState::InObject(name.to_string()),
            (ScanState::InObject(_), LineEvent::ObjectStop) => ScanState::Idle,
            (ScanState::InObject(name), LineEvent::Move(point)) => {
                self.table.extend(&name, point);
                ScanState::InObject(name)
            }
            (ScanState::InObject(name), LineEvent::MalformedMove) => {
                tracing::trace!("Skipping malformed move on line {}", line_number);
                self.skipped_lines += 1;
                ScanState::InObject(name)
            }
            (state, _) => state,
        };
    }

    fn finish(self) -> ObjectScan {
        ObjectScan {
            objects: self.table.extents,
            skipped_lines: self.skipped_lines,
        }
    }
}

/// Attributes a job's bounding-box volume across its named objects
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectVolumeAnalyzer;

impl ObjectVolumeAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Scan every line and return each object's final bounding box
    pub fn scan(&self, document: &Document) -> ObjectScan {
        let mut scanner = Scanner::default();
        for (i, line) in document.lines().enumerate() {
            scanner.step(i + 1, LineEvent::classify(line));
        }

        let scan = scanner.finish();
        tracing::debug!(
            "Scanned {} objects ({} malformed move lines skipped)",
            scan.objects.len(),
            scan.skipped_lines
        );
        scan
    }

    /// Per-object volume fractions, or `None` if no object has positive volume
    pub fn analyze(&self, document: &Document) -> Option<VolumeReport> {
        let report = self.scan(document).report();
        if report.is_none() {
            tracing::debug!("No object produced a positive bounding-box volume");
        }
        report
    }
}

/// Per-object volume fractions of `document`
pub fn analyze_per_part_volume(document: &Document) -> Option<VolumeReport> {
    ObjectVolumeAnalyzer::new().analyze(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markers() {
        assert_eq!(
            LineEvent::classify("; printing object  Benchy id:0 copy 0  "),
            LineEvent::ObjectStart("Benchy id:0 copy 0")
        );
        assert_eq!(
            LineEvent::classify("; stop printing object Benchy"),
            LineEvent::ObjectStop
        );
        assert_eq!(LineEvent::classify("; printing objects"), LineEvent::Other);
        assert_eq!(LineEvent::classify(";printing object A"), LineEvent::Other);
    }

    #[test]
    fn test_classify_moves() {
        assert_eq!(
            LineEvent::classify("G1 X1.5 Y2 Z0.2"),
            LineEvent::Move(Point3::new(1.5, 2.0, 0.2))
        );
        assert_eq!(
            LineEvent::classify("G1 F1200 X10 Y20 Z3 E0.4"),
            LineEvent::Move(Point3::new(10.0, 20.0, 3.0))
        );
        assert_eq!(LineEvent::classify("G1 X1 Y2"), LineEvent::Other);
        assert_eq!(LineEvent::classify("G1 Z0.4"), LineEvent::Other);
        assert_eq!(LineEvent::classify("G0 X1 Y2 Z3"), LineEvent::Other);
        assert_eq!(LineEvent::classify(" G1 X1 Y2 Z3"), LineEvent::Other);
        assert_eq!(
            LineEvent::classify("G1 X1.2.3 Y2 Z3"),
            LineEvent::MalformedMove
        );
    }

    #[test]
    fn test_step_transitions() {
        let mut scanner = Scanner::default();
        assert_eq!(scanner.state, ScanState::Idle);

        scanner.step(1, LineEvent::ObjectStop);
        assert_eq!(scanner.state, ScanState::Idle);

        scanner.step(2, LineEvent::ObjectStart("A"));
        assert_eq!(scanner.state.current_object(), Some("A"));

        scanner.step(3, LineEvent::ObjectStart("B"));
        assert_eq!(scanner.state.current_object(), Some("B"));

        scanner.step(4, LineEvent::Other);
        assert_eq!(scanner.state.current_object(), Some("B"));

        scanner.step(5, LineEvent::ObjectStop);
        assert_eq!(scanner.state, ScanState::Idle);
    }

    #[test]
    fn test_blank_start_closes_object() {
        assert_eq!(
            LineEvent::classify("; printing object    "),
            LineEvent::ObjectStart("")
        );

        let mut scanner = Scanner::default();
        scanner.step(1, LineEvent::ObjectStart("A"));
        scanner.step(2, LineEvent::ObjectStart(""));
        assert_eq!(scanner.state, ScanState::Idle);

        scanner.step(3, LineEvent::Move(Point3::new(1.0, 1.0, 1.0)));
        assert!(scanner.finish().objects.is_empty());
    }

    #[test]
    fn test_idle_moves_are_ignored() {
        let mut scanner = Scanner::default();
        scanner.step(1, LineEvent::Move(Point3::new(1.0, 1.0, 1.0)));
        scanner.step(2, LineEvent::MalformedMove);

        let scan = scanner.finish();
        assert!(scan.objects.is_empty());
        assert_eq!(scan.skipped_lines, 0);
    }
}
