use hdf5::types::VarLenUnicode;
use hdf5::File;
use ndarray::Array1;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::HistogramError;
use super::histogram::{HistogramSink, H1};

const HISTOGRAMS_NAME: &str = "histograms";
/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens an HDF5 file and writes each monitoring histogram as a dataset of its bin
/// contents (under- and overflow included) with the binning stored as attributes.
/// Every write replaces the datasets of the previous cycle.
// Structure
// histograms - version
// |---- <name>(dset) - title, nbins, xmin, xmax, entries
#[derive(Debug)]
pub struct HDFHistogramWriter {
    file_handle: File,
    file_path: PathBuf,
    histograms_group: hdf5::Group,
}

impl HDFHistogramWriter {
    /// Create the writer, opening a file at path and creating the histogram group
    pub fn new(path: &Path) -> Result<Self, HistogramError> {
        let file_handle = File::create(path)?;
        let version = format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION);
        let histograms_group = file_handle.create_group(HISTOGRAMS_NAME)?;
        histograms_group
            .new_attr::<VarLenUnicode>()
            .create("version")?
            .write_scalar(&to_unicode(&version)?)?;
        Ok(Self {
            file_handle,
            file_path: path.to_path_buf(),
            histograms_group,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn write_histogram(&self, hist: &H1) -> Result<(), HistogramError> {
        if self.histograms_group.link_exists(hist.name()) {
            self.histograms_group.unlink(hist.name())?;
        }
        let data = Array1::from_vec(hist.bins().to_vec());
        let dset = self
            .histograms_group
            .new_dataset_builder()
            .with_data(&data)
            .create(hist.name())?;
        let (xmin, xmax) = hist.range();
        dset.new_attr::<VarLenUnicode>()
            .create("title")?
            .write_scalar(&to_unicode(hist.title())?)?;
        dset.new_attr::<u64>()
            .create("nbins")?
            .write_scalar(&(hist.nbins() as u64))?;
        dset.new_attr::<f64>().create("xmin")?.write_scalar(&xmin)?;
        dset.new_attr::<f64>().create("xmax")?.write_scalar(&xmax)?;
        dset.new_attr::<u64>()
            .create("entries")?
            .write_scalar(&hist.entries())?;
        Ok(())
    }
}

impl HistogramSink for HDFHistogramWriter {
    fn write(&mut self, hists: &[&H1]) -> Result<(), HistogramError> {
        for hist in hists {
            self.write_histogram(hist)?;
        }
        self.file_handle.flush()?;
        Ok(())
    }
}

fn to_unicode(value: &str) -> Result<VarLenUnicode, HistogramError> {
    VarLenUnicode::from_str(value).map_err(|_| HistogramError::BadTitle(value.to_string()))
}
