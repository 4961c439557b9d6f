//! Output sinks receiving one [`Record`] per reporting window.
//!
//! A sink decides whether a window is persisted. The provided sinks persist
//! every `AtStart` and `AtEnd` window and every `interval`-th `During` window.

use std::io::{ self, Write };
use tracing::warn;
use crate::rep::{ Mode, When };

/// Values computed in one reporting window.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Pass index of the run.
    pub pass: usize,
    /// Phase of the run.
    pub when: When,
    /// Number of completed steps.
    pub step: usize,
    /// Elapsed simulated time.
    pub time: f64,
    /// Most recently stored value of every value-storing expression, in
    /// declaration order.
    pub values: Vec<f64>,
}

/// Receives the results of reporting windows.
pub trait OutputSink {
    /// Called once per run (or pass), before any window.
    fn init(&mut self, mode: Mode, scheme: &str, pass: usize, columns: &[String]);

    /// Called once per reporting window; persist the record or discard it.
    fn log_or_pass(&mut self, mode: Mode, record: &Record);
}

fn sampled(interval: usize, record: &Record) -> bool {
    record.when != When::During || record.step % interval == 0
}

/// Sink retaining persisted records in memory.
#[derive(Clone, Debug)]
pub struct MemorySink {
    interval: usize,
    columns: Vec<String>,
    records: Vec<Record>,
    seen: usize,
}

impl MemorySink {
    /// Create a new sink persisting every `interval`-th `During` window.
    ///
    /// *Panics if `interval == 0`*.
    pub fn new(interval: usize) -> Self {
        assert!(interval > 0, "output interval must be greater than 0");
        Self { interval, columns: Vec::new(), records: Vec::new(), seen: 0 }
    }

    /// Return the column labels given at the last `init`.
    pub fn columns(&self) -> &[String] { &self.columns }

    /// Return all persisted records.
    pub fn records(&self) -> &[Record] { &self.records }

    /// Return the number of windows offered, persisted or not.
    pub fn seen(&self) -> usize { self.seen }

    /// Return the persisted history of a single column.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let k = self.columns.iter().position(|c| c == label)?;
        Some(self.records.iter().map(|r| r.values[k]).collect())
    }

    /// Return the most recently persisted value of a column.
    pub fn last(&self, label: &str) -> Option<f64> {
        let k = self.columns.iter().position(|c| c == label)?;
        self.records.last().map(|r| r.values[k])
    }
}

impl Default for MemorySink {
    fn default() -> Self { Self::new(1) }
}

impl OutputSink for MemorySink {
    fn init(&mut self, _mode: Mode, _scheme: &str, _pass: usize, columns: &[String]) {
        self.columns = columns.to_vec();
    }

    fn log_or_pass(&mut self, _mode: Mode, record: &Record) {
        self.seen += 1;
        if sampled(self.interval, record) {
            self.records.push(record.clone());
        }
    }
}

/// Sink writing persisted records as whitespace-separated columns.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct TableSink<W> {
    out: W,
    interval: usize,
}

impl<W: Write> TableSink<W> {
    /// Create a new sink persisting every `interval`-th `During` window.
    ///
    /// *Panics if `interval == 0`*.
    pub fn new(out: W, interval: usize) -> Self {
        assert!(interval > 0, "output interval must be greater than 0");
        Self { out, interval }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W { self.out }

    fn write_header(&mut self, mode: Mode, scheme: &str, pass: usize, columns: &[String])
        -> io::Result<()>
    {
        writeln!(self.out, "# mode: {mode}, scheme: {scheme}, pass: {pass}")?;
        write!(self.out, "# {:>6} {:>8} {:>16}", "when", "step", "time")?;
        for col in columns {
            write!(self.out, " {:>16}", col)?;
        }
        writeln!(self.out)
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let when = match record.when {
            When::AtStart => "start",
            When::During => "during",
            When::AtEnd => "end",
        };
        write!(self.out, "  {:>6} {:>8} {:>16.8e}", when, record.step, record.time)?;
        for val in &record.values {
            write!(self.out, " {:>16.8e}", val)?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> OutputSink for TableSink<W> {
    fn init(&mut self, mode: Mode, scheme: &str, pass: usize, columns: &[String]) {
        if let Err(err) = self.write_header(mode, scheme, pass, columns) {
            warn!("failed to write output header: {}", err);
        }
    }

    fn log_or_pass(&mut self, _mode: Mode, record: &Record) {
        if !sampled(self.interval, record) { return; }
        if let Err(err) = self.write_record(record) {
            warn!("failed to write record at step {}: {}", record.step, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(when: When, step: usize) -> Record {
        Record { pass: 0, when, step, time: step as f64 * 0.5, values: vec![step as f64] }
    }

    #[test]
    fn memory_sink_samples_during() {
        let mut sink = MemorySink::new(3);
        sink.init(Mode::Real, "strang", 0, &["x".to_string()]);
        sink.log_or_pass(Mode::Real, &record(When::AtStart, 0));
        (1..=7).for_each(|k| sink.log_or_pass(Mode::Real, &record(When::During, k)));
        sink.log_or_pass(Mode::Real, &record(When::AtEnd, 8));
        let steps: Vec<usize> = sink.records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 3, 6, 8]);
        assert_eq!(sink.seen(), 9);
        assert_eq!(sink.column("x"), Some(vec![0.0, 3.0, 6.0, 8.0]));
        assert_eq!(sink.last("x"), Some(8.0));
        assert_eq!(sink.column("y"), None);
    }

    #[test]
    fn table_sink_writes_header_and_rows() {
        let mut sink = TableSink::new(Vec::<u8>::new(), 2);
        sink.init(Mode::Imag, "lie", 1, &["e".to_string()]);
        sink.log_or_pass(Mode::Imag, &record(When::AtStart, 0));
        sink.log_or_pass(Mode::Imag, &record(When::During, 1));
        sink.log_or_pass(Mode::Imag, &record(When::During, 2));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# mode: IM, scheme: lie, pass: 1");
        assert!(lines[1].ends_with("e"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("start"));
        assert!(lines[3].contains("during"));
    }
}
