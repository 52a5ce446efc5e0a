//! VDC efficiency accumulated through the decoder and written to a histogram sink

use libdecdata::config::DecDataConfig;
use libdecdata::decoder::DecData;
use libdecdata::efficiency::{PlaneWires, NO_WIRES};
use libdecdata::event_data::SimEvent;
use libdecdata::histogram::{MemorySink, YamlHistogramWriter};
use libdecdata::variables::VarList;
use time::macros::date;

fn setup() -> (tempfile::TempDir, DecData, VarList) {
    let dir = tempfile::tempdir().unwrap();
    let map_file = dir.path().join("decdata.map");
    std::fs::write(&map_file, "foo crate 1 2 3\n").unwrap();
    let config = DecDataConfig {
        map_file,
        ..Default::default()
    };
    let mut vars = VarList::new();
    let mut decdata = DecData::new(config, &mut vars).unwrap();
    decdata.init(&mut vars, date!(2005 - 06 - 01)).unwrap();
    (dir, decdata, vars)
}

#[test]
fn efficiency_after_500_and_1000_events() {
    let (_dir, mut decdata, _vars) = setup();
    let sink = MemorySink::new();
    decdata.set_histogram_sink(Box::new(sink.clone()));
    let event = SimEvent::new(1);

    let all_fired = [10, 11, 12];
    let middle_missing = [12, 10];
    let right_u1 = [200, 201, 202];
    let mut both: PlaneWires = NO_WIRES;
    both[0] = Some(&all_fired[..]);
    both[4] = Some(&right_u1[..]);
    let mut gap: PlaneWires = NO_WIRES;
    gap[0] = Some(&middle_missing[..]);

    for _ in 0..500 {
        decdata.decode(&event, &both).unwrap();
    }
    assert_eq!(sink.n_writes(), 1);
    assert_eq!(decdata.efficiency().efficiency(0, 11), Some(1.0));
    assert_eq!(decdata.efficiency().efficiency(4, 201), Some(1.0));
    assert_eq!(decdata.efficiency().efficiency(0, 12), None);
    let lu1eff = sink.last("Lu1eff").unwrap();
    assert_eq!(lu1eff.bin_content(lu1eff.find_bin(11.0)), 1.0);

    // 125 more with wire 11 present, 375 with it missing: 625 hits in 1000 chances
    for _ in 0..125 {
        decdata.decode(&event, &both).unwrap();
    }
    for _ in 0..375 {
        decdata.decode(&event, &gap).unwrap();
    }
    assert_eq!(sink.n_writes(), 2);
    assert_eq!(decdata.efficiency().opportunities(0, 11), 1000);
    assert_eq!(decdata.efficiency().hits(0, 11), 625);
    assert_eq!(decdata.efficiency().efficiency(0, 11), Some(0.625));
    assert_eq!(decdata.efficiency().efficiency(4, 201), Some(1.0));
    let lu1eff = sink.last("Lu1eff").unwrap();
    assert_eq!(lu1eff.bin_content(lu1eff.find_bin(11.0)), 0.625);
    assert_eq!(lu1eff.entries(), 1);
    let lu1nhit = sink.last("Lu1nhit").unwrap();
    assert_eq!(lu1nhit.bin_content(lu1nhit.find_bin(3.0)), 625.0);
    assert_eq!(lu1nhit.bin_content(lu1nhit.find_bin(2.0)), 375.0);
}

#[test]
fn zero_efficiency_is_not_published() {
    let (_dir, mut decdata, _vars) = setup();
    let sink = MemorySink::new();
    decdata.set_histogram_sink(Box::new(sink.clone()));
    let event = SimEvent::new(1);
    let gap_wires = [30, 32];
    let mut gap: PlaneWires = NO_WIRES;
    gap[2] = Some(&gap_wires[..]);
    for _ in 0..500 {
        decdata.decode(&event, &gap).unwrap();
    }
    assert_eq!(decdata.efficiency().efficiency(2, 31), Some(0.0));
    assert_eq!(sink.last("Lv1eff").unwrap().entries(), 0);
}

#[test]
fn reinit_keeps_statistics_and_reset_clears_them() {
    let (dir, mut decdata, mut vars) = setup();
    let event = SimEvent::new(1);
    let wires = [10, 11, 12];
    let mut planes: PlaneWires = NO_WIRES;
    planes[0] = Some(&wires[..]);
    for _ in 0..10 {
        decdata.decode(&event, &planes).unwrap();
    }
    std::fs::write(dir.path().join("decdata.map"), "foo crate 1 2 4\n").unwrap();
    decdata.init(&mut vars, date!(2005 - 06 - 02)).unwrap();
    assert_eq!(decdata.efficiency().event_counter(), 10);
    assert_eq!(decdata.efficiency().hits(0, 11), 10);

    decdata.reset();
    assert_eq!(decdata.efficiency().event_counter(), 0);
    assert_eq!(decdata.efficiency().hits(0, 11), 0);
}

#[test]
fn yaml_histograms_at_end_of_run() {
    let (dir, mut decdata, _vars) = setup();
    let path = dir.path().join("hists.yml");
    decdata.set_histogram_sink(Box::new(YamlHistogramWriter::new(&path)));
    let mut event = SimEvent::new(1);
    event.set_roc_words(12, vec![0; 250]);
    decdata.decode(&event, &NO_WIRES).unwrap();
    decdata.end().unwrap();

    let hists = YamlHistogramWriter::read(&path).unwrap();
    assert_eq!(hists.len(), 18);
    let lenroc12 = &hists["Lenroc12"];
    assert_eq!(lenroc12.bin_content(lenroc12.find_bin(250.0)), 1.0);
    assert_eq!(hists["Lenroc16"].bin_content(1), 1.0);
}
