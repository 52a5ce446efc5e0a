use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::error::HistogramError;

/// Booking information for a fixed-shape histogram
#[derive(Debug, Clone, Copy)]
pub struct HistDef {
    pub name: &'static str,
    pub title: &'static str,
    pub nbins: usize,
    pub xmin: f64,
    pub xmax: f64,
}

/// A fixed-binning 1-D histogram.
///
/// Bin 0 is the underflow and bin nbins+1 the overflow, so bin `i` (1..=nbins) covers
/// `[xmin + (i-1)*width, xmin + i*width)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H1 {
    name: String,
    title: String,
    nbins: usize,
    xmin: f64,
    xmax: f64,
    entries: u64,
    bins: Vec<f64>,
}

impl H1 {
    pub fn new(name: &str, title: &str, nbins: usize, xmin: f64, xmax: f64) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            nbins,
            xmin,
            xmax,
            entries: 0,
            bins: vec![0.0; nbins + 2],
        }
    }

    pub fn from_def(def: &HistDef) -> Self {
        Self::new(def.name, def.title, def.nbins, def.xmin, def.xmax)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn range(&self) -> (f64, f64) {
        (self.xmin, self.xmax)
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// All bin contents including under- and overflow
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.xmin {
            0
        } else if x >= self.xmax {
            self.nbins + 1
        } else {
            let width = (self.xmax - self.xmin) / self.nbins as f64;
            // Guard against rounding at the upper edge
            (1 + ((x - self.xmin) / width) as usize).min(self.nbins)
        }
    }

    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, weight: f64) {
        let bin = self.find_bin(x);
        self.bins[bin] += weight;
        self.entries += 1;
    }

    pub fn bin_content(&self, bin: usize) -> f64 {
        self.bins.get(bin).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.entries = 0;
    }
}

/// Destination for monitoring histograms. Each write replaces the previously written cycle.
pub trait HistogramSink: std::fmt::Debug {
    fn write(&mut self, hists: &[&H1]) -> Result<(), HistogramError>;
}

/// Keeps a copy of every write in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    writes: Rc<RefCell<Vec<Vec<H1>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_writes(&self) -> usize {
        self.writes.borrow().len()
    }

    /// The most recently written histogram with the given name
    pub fn last(&self, name: &str) -> Option<H1> {
        self.writes
            .borrow()
            .last()
            .and_then(|cycle| cycle.iter().find(|h| h.name() == name).cloned())
    }
}

impl HistogramSink for MemorySink {
    fn write(&mut self, hists: &[&H1]) -> Result<(), HistogramError> {
        self.writes
            .borrow_mut()
            .push(hists.iter().map(|h| (*h).clone()).collect());
        Ok(())
    }
}

/// Writes the histograms to a YAML file, keyed by histogram name
#[derive(Debug, Clone)]
pub struct YamlHistogramWriter {
    path: PathBuf,
}

impl YamlHistogramWriter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read back a file written by this sink
    pub fn read(path: &Path) -> Result<BTreeMap<String, H1>, HistogramError> {
        let yaml_str = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml_str)?)
    }
}

impl HistogramSink for YamlHistogramWriter {
    fn write(&mut self, hists: &[&H1]) -> Result<(), HistogramError> {
        let hist_map: BTreeMap<&str, &H1> = hists.iter().map(|h| (h.name(), *h)).collect();
        let mut file = std::fs::File::create(&self.path)?;
        file.write_all(serde_yaml::to_string(&hist_map)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning() {
        let mut hist = H1::new("nhit", "Num Hits", 50, -1.0, 49.0);
        hist.fill(-1.0);
        hist.fill(0.0);
        hist.fill(0.5);
        hist.fill(-2.0);
        hist.fill(49.0);
        assert_eq!(hist.bin_content(1), 1.0);
        assert_eq!(hist.bin_content(2), 2.0);
        assert_eq!(hist.bin_content(0), 1.0);
        assert_eq!(hist.bin_content(51), 1.0);
        assert_eq!(hist.entries(), 5);

        hist.reset();
        assert_eq!(hist.entries(), 0);
        assert!(hist.bins().iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_weighted() {
        let mut hist = H1::new("eff", "Efficiency", 400, 0.0, 400.0);
        hist.fill_weighted(11.0, 0.625);
        assert_eq!(hist.bin_content(12), 0.625);
        assert_eq!(hist.find_bin(399.999), 400);
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        let mut boxed: Box<dyn HistogramSink> = Box::new(sink.clone());
        let mut hist = H1::new("a", "A", 10, 0.0, 10.0);
        hist.fill(3.0);
        boxed.write(&[&hist]).unwrap();
        assert_eq!(sink.n_writes(), 1);
        assert_eq!(sink.last("a").unwrap().bin_content(4), 1.0);
        assert!(sink.last("b").is_none());
    }

    #[test]
    fn test_yaml_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hists.yml");
        let mut writer = YamlHistogramWriter::new(&path);
        let mut hist = H1::new("Lenroc12", "Event length in ROC12", 500, 0.0, 5000.0);
        hist.fill(120.0);
        writer.write(&[&hist]).unwrap();
        let read = YamlHistogramWriter::read(&path).unwrap();
        assert_eq!(read.get("Lenroc12"), Some(&hist));
    }
}
