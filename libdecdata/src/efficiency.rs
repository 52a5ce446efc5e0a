use bit_set::BitSet;
use ndarray::Array2;

use super::constants::{
    EARLY_FLUSH_LIMIT, EFFICIENCY_UPDATE_INTERVAL, LATE_FLUSH_INTERVAL, N_WIRE, VDC_PLANES,
};
use super::histogram::{HistDef, H1};

/// Fired wire numbers of every VDC plane for one event, in the order of VDC_PLANE_NAMES.
/// A plane is None when the tracking detector published no wire list for it.
pub type PlaneWires<'a> = [Option<&'a [i32]>; VDC_PLANES];

pub const NO_WIRES: PlaneWires<'static> = [None; VDC_PLANES];

/// The tracking-detector variables the wire lists are taken from
pub const VDC_PLANE_NAMES: [&str; VDC_PLANES] = [
    "L.vdc.u1.wire",
    "L.vdc.u2.wire",
    "L.vdc.v1.wire",
    "L.vdc.v2.wire",
    "R.vdc.u1.wire",
    "R.vdc.u2.wire",
    "R.vdc.v1.wire",
    "R.vdc.v2.wire",
];

const fn hist(
    name: &'static str,
    title: &'static str,
    nbins: usize,
    xmin: f64,
    xmax: f64,
) -> HistDef {
    HistDef {
        name,
        title,
        nbins,
        xmin,
        xmax,
    }
}

const NHIT_HISTS: [HistDef; VDC_PLANES] = [
    hist("Lu1nhit", "Num Hits Left U1", 50, -1.0, 49.0),
    hist("Lu2nhit", "Num Hits Left U2", 50, -1.0, 49.0),
    hist("Lv1nhit", "Num Hits Left V1", 50, -1.0, 49.0),
    hist("Lv2nhit", "Num Hits Left V2", 50, -1.0, 49.0),
    hist("Ru1nhit", "Num Hits Right U1", 50, -1.0, 49.0),
    hist("Ru2nhit", "Num Hits Right U2", 50, -1.0, 49.0),
    hist("Rv1nhit", "Num Hits Right V1", 50, -1.0, 49.0),
    hist("Rv2nhit", "Num Hits Right V2", 50, -1.0, 49.0),
];

const EFF_HISTS: [HistDef; VDC_PLANES] = [
    hist("Lu1eff", "Left arm U1 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Lu2eff", "Left arm U2 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Lv1eff", "Left arm V1 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Lv2eff", "Left arm V2 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Ru1eff", "Right arm U1 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Ru2eff", "Right arm U2 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Rv1eff", "Right arm V1 efficiency", N_WIRE, 0.0, N_WIRE as f64),
    hist("Rv2eff", "Right arm V2 efficiency", N_WIRE, 0.0, N_WIRE as f64),
];

/// Online per-wire VDC efficiency.
///
/// A track crossing a plane normally fires neighbouring wires. Whenever wires `w` and
/// `w+2` both fired, wire `w+1` had an opportunity to fire and counts as hit if it did.
/// The counters accumulate over the run; the efficiency curve `hit/opportunity` is
/// recomputed and published every EFFICIENCY_UPDATE_INTERVAL events.
#[derive(Debug, Clone)]
pub struct VdcEfficiency {
    opportunities: Array2<u64>, // [plane, wire]
    hits: Array2<u64>,
    curve: Array2<f64>, // NaN where the efficiency is undefined
    event_counter: u64,
    nhit_hists: Vec<H1>,
    eff_hists: Vec<H1>,
}

impl Default for VdcEfficiency {
    fn default() -> Self {
        Self::new()
    }
}

impl VdcEfficiency {
    pub fn new() -> Self {
        Self {
            opportunities: Array2::zeros((VDC_PLANES, N_WIRE)),
            hits: Array2::zeros((VDC_PLANES, N_WIRE)),
            curve: Array2::from_elem((VDC_PLANES, N_WIRE), f64::NAN),
            event_counter: 0,
            nhit_hists: NHIT_HISTS.iter().map(H1::from_def).collect(),
            eff_hists: EFF_HISTS.iter().map(H1::from_def).collect(),
        }
    }

    /// Prepare for (re)starting accumulation.
    ///
    /// A full reset zeros all statistics; otherwise the accumulated statistics carry over.
    pub fn begin(&mut self, full_reset: bool) {
        if full_reset {
            self.opportunities.fill(0);
            self.hits.fill(0);
            self.curve.fill(f64::NAN);
            self.event_counter = 0;
            self.reset_histograms();
        } else {
            spdlog::debug!(
                "VDC efficiency keeps its statistics from {} events",
                self.event_counter
            );
        }
    }

    /// Accumulate one event. Returns true when the histograms are due to be written.
    pub fn process(&mut self, wires: &PlaneWires) -> bool {
        for (plane, wire_list) in wires.iter().enumerate() {
            if let Some(wire_list) = wire_list {
                self.process_plane(plane, wire_list);
            }
        }

        self.event_counter += 1;
        if self.event_counter % EFFICIENCY_UPDATE_INTERVAL == 0 {
            self.publish();
        }
        (self.event_counter < EARLY_FLUSH_LIMIT
            && self.event_counter % EFFICIENCY_UPDATE_INTERVAL == 0)
            || self.event_counter % LATE_FLUSH_INTERVAL == 0
    }

    fn process_plane(&mut self, plane: usize, wire_list: &[i32]) {
        self.nhit_hists[plane].fill(wire_list.len() as f64);

        let wire_list = &wire_list[..wire_list.len().min(N_WIRE)];
        let mut fired = BitSet::with_capacity(N_WIRE);
        for wire in wire_list.iter().filter_map(|w| wire_index(*w)) {
            fired.insert(wire);
        }

        // wire_list need not be ordered
        for wire in wire_list.iter().filter_map(|w| usize::try_from(*w).ok()) {
            let neighbor = wire + 2;
            if neighbor >= N_WIRE || !fired.contains(neighbor) {
                continue;
            }
            let middle = wire + 1;
            self.opportunities[[plane, middle]] += 1;
            if fired.contains(middle) {
                self.hits[[plane, middle]] += 1;
            }
        }
    }

    /// Recompute the efficiency curve and refill the efficiency histograms
    fn publish(&mut self) {
        for plane in 0..VDC_PLANES {
            let hist = &mut self.eff_hists[plane];
            hist.reset();
            for wire in 0..N_WIRE {
                let opportunities = self.opportunities[[plane, wire]];
                let eff = if opportunities != 0 {
                    self.hits[[plane, wire]] as f64 / opportunities as f64
                } else {
                    f64::NAN
                };
                self.curve[[plane, wire]] = eff;
                if eff > 0.0 {
                    hist.fill_weighted(wire as f64, eff);
                }
            }
        }
    }

    /// The last published efficiency of a wire, None if it is undefined
    pub fn efficiency(&self, plane: usize, wire: usize) -> Option<f64> {
        self.curve
            .get([plane, wire])
            .copied()
            .filter(|eff| !eff.is_nan())
    }

    pub fn opportunities(&self, plane: usize, wire: usize) -> u64 {
        self.opportunities.get([plane, wire]).copied().unwrap_or(0)
    }

    pub fn hits(&self, plane: usize, wire: usize) -> u64 {
        self.hits.get([plane, wire]).copied().unwrap_or(0)
    }

    pub fn event_counter(&self) -> u64 {
        self.event_counter
    }

    /// The hit-count histograms followed by the efficiency histograms
    pub fn histograms(&self) -> impl Iterator<Item = &H1> {
        self.nhit_hists.iter().chain(self.eff_hists.iter())
    }

    pub fn reset_histograms(&mut self) {
        self.nhit_hists
            .iter_mut()
            .chain(self.eff_hists.iter_mut())
            .for_each(|h| h.reset());
    }
}

fn wire_index(wire: i32) -> Option<usize> {
    usize::try_from(wire).ok().filter(|w| *w < N_WIRE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_coincidence() {
        let mut eff = VdcEfficiency::new();
        let plane0 = [10, 12, 11];
        let plane1 = [20, 22];
        let mut wires = NO_WIRES;
        wires[0] = Some(&plane0[..]);
        wires[1] = Some(&plane1[..]);
        eff.process(&wires);

        assert_eq!(eff.opportunities(0, 11), 1);
        assert_eq!(eff.hits(0, 11), 1);
        assert_eq!(eff.opportunities(1, 21), 1);
        assert_eq!(eff.hits(1, 21), 0);
        assert_eq!(eff.opportunities(0, 12), 0);
        assert_eq!(eff.event_counter(), 1);
        // Nothing published before the first update
        assert_eq!(eff.efficiency(0, 11), None);
    }

    #[test]
    fn test_out_of_range_wires() {
        let mut eff = VdcEfficiency::new();
        let plane0 = [-2, 0, 397, 399, 400, 401];
        let mut wires = NO_WIRES;
        wires[0] = Some(&plane0[..]);
        eff.process(&wires);
        // -2 and 400+ never fire; 399 is the neighbour of 397
        assert_eq!(eff.opportunities(0, 398), 1);
        assert_eq!(eff.hits(0, 398), 0);
        assert_eq!(eff.opportunities(0, 0), 0);
        assert_eq!(eff.opportunities(0, 400), 0);
        let nhit = eff.histograms().next().unwrap();
        assert_eq!(nhit.bin_content(nhit.find_bin(6.0)), 1.0);
    }

    #[test]
    fn test_only_first_n_wire_entries_used() {
        let mut eff = VdcEfficiency::new();
        let mut plane0: Vec<i32> = vec![0; N_WIRE];
        plane0.extend([50, 52]);
        let mut wires = NO_WIRES;
        wires[0] = Some(&plane0[..]);
        eff.process(&wires);
        assert_eq!(eff.opportunities(0, 51), 0);
    }

    #[test]
    fn test_flush_cadence() {
        let mut eff = VdcEfficiency::new();
        let mut flushes = Vec::new();
        for _ in 0..10_000 {
            if eff.process(&NO_WIRES) {
                flushes.push(eff.event_counter());
            }
        }
        assert_eq!(flushes, vec![500, 1000, 1500, 5000, 10_000]);
    }

    #[test]
    fn test_rebind_keeps_statistics() {
        let mut eff = VdcEfficiency::new();
        let plane0 = [10, 11, 12];
        let mut wires = NO_WIRES;
        wires[0] = Some(&plane0[..]);
        eff.process(&wires);
        eff.begin(false);
        assert_eq!(eff.hits(0, 11), 1);
        assert_eq!(eff.event_counter(), 1);
        eff.begin(true);
        assert_eq!(eff.hits(0, 11), 0);
        assert_eq!(eff.event_counter(), 0);
    }
}
