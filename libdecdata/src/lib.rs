//! # decdata
//!
//! decdata decodes the "miscellaneous" per-event data of a two-arm spectrometer: data
//! synchronization checks, time stamps, coincidence times, RF and pulser times, and the
//! trigger bit pattern. Each of these values lives somewhere in the raw front-end data,
//! either at a (crate, slot, channel) address or at a fixed number of words after a marker
//! word in a crate's raw buffer. decdata reads a small mapping file which says where, and
//! extracts the values (up to 16 hits each) every event. It also accumulates an online
//! per-wire efficiency of the vertical drift chambers (VDC) from the fired-wire lists of
//! the tracking code.
//!
//! ## Installation
//!
//! decdata is installed from source.
//!
//! ### Rust
//!
//! If you have not used Rust before, you will most likely need to install the Rust tool
//! chain. See the [Rust docs](https://www.rust-lang.org/tools/install) for installation
//! instructions.
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./decdata_cli` from the top level
//! decdata repository. The library is used by adding `libdecdata` as a dependency.
//!
//! ### HDF5
//!
//! Monitoring histograms can optionally be written to HDF5 by enabling the `hdf5` feature
//! of `libdecdata`. HDF5 must then be installed. Typically this will be done using a
//! package manager (homebrew, apt, etc), and the Rust libraries will auto detect the
//! location of the HDF install. If not, set `HDF5_DIR` in `.cargo/config.toml`:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//! ```
//!
//! ## Configuration
//!
//! A DecData is configured through a YAML file:
//!
//! ```yml
//! prefix: D.
//! map_file: decdata.map
//! db_dir: /path/to/DB
//! db_name: D
//! trigger_cut:
//!   low: 0
//!   high: 1500
//! histogram_path: decdata_hists.yml
//! ```
//!
//! - prefix: Prepended to every published variable name.
//! - map_file: The mapping file to try first, normally in the current directory.
//! - db_dir (Optional): A database directory. It is searched for `db_<db_name>.dat` in the
//! latest `YYYYMMDD` subdirectory which is not later than the run date, then in
//! `DEFAULT/`, then in the directory itself.
//! - trigger_cut: The exclusive TDC window a trigger bit hit must fall in.
//! - histogram_path (Optional): Where the monitoring histograms are written (YAML).
//!
//! If no mapping file is found on the first initialization, a built-in default map is
//! used. If none is found on re-initialization, the current mapping is kept.
//!
//! ### Mapping File Format
//!
//! One Location per line, whitespace separated:
//!
//! ```text
//! # name      keyword crate slot   channel
//! synchadc1   crate   1     25     16
//! bit1        crate   3     5      64
//! # name      keyword crate marker skip
//! timeroc1    header  1     fabc0004 4
//! ```
//!
//! The keyword `crate` means a (crate, slot, channel) address; any other keyword means a
//! hexadecimal marker word followed by the number of words to skip past it. Lines starting
//! with `#` or with fewer than five fields are ignored.
//!
//! The names `synchadc1-4`, `synchadc14`, `ctimel`, `ctimer`, `pulser1`, `timestamp`,
//! `timeroc1-4`, `timeroc14`, `rftime1`, `rftime2`, `edtpl` and `edtpr` feed predefined
//! variables. Names `bitN` are trigger bits. Every other name is published as a generic
//! variable `<prefix><name>`.
//!
//! ## Output
//!
//! Values are published through a [`variables::VariableRegistry`]. Monitoring histograms
//! (hit counts and efficiency per VDC plane, ROC12/ROC16 event lengths) are written to a
//! [`histogram::HistogramSink`] every 500 events early in the run, every 5000 events after
//! that, and at the end of the run.
pub mod channel_map;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod efficiency;
pub mod error;
pub mod event_data;
#[cfg(feature = "hdf5")]
pub mod hdf_writer;
pub mod histogram;
pub mod location;
pub mod outputs;
pub mod registry;
pub mod trigger_bits;
pub mod variables;
