//! End-to-end tests: tables on disk, configuration, session and drawing.

use std::path::Path;
use std::time::{Duration, Instant};

use lightning_graph::config::{LayoutConfig, LocusConfig, StyleConfig, ViewerConfig};
use lightning_graph::error::GraphError;
use lightning_graph::graph::LightningGraph;
use lightning_graph::layout::LayoutGeometry;
use lightning_graph::render::{DisplayList, DrawCommand};
use lightning_graph::store::{GraphStore, MemoryStore};
use lightning_graph::viewer::{InputEvent, MouseButton, Session};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

/// A small locus exported as CSV tables: two steps, one tag, three bodies,
/// one sample with two alleles, and a join to a sequence that does not exist.
fn write_locus(dir: &Path) {
    write(
        dir,
        "Sequence.csv",
        "ID,fastaID,sequenceRecordName,md5checksum,length\n\
         1,1,x.247.abc.t0f,0,24\n\
         2,1,x.247.abc.r0,0,120\n\
         3,1,x.247.abc.r1+2,0,200\n\
         4,1,x.247.abd.r0,0,60\n",
    );
    write(
        dir,
        "GraphJoin.csv",
        "ID,side1SequenceID,side1Position,side1StrandIsForward,side2SequenceID,side2Position,side2StrandIsForward\n\
         1,1,23,TRUE,2,0,TRUE\n\
         2,4,0,'TRUE',2,119,'TRUE'\n\
         3,3,199,TRUE,4,0,FALSE\n\
         4,4,59,TRUE,404,0,TRUE\n",
    );
    write(dir, "CallSet.csv", "ID,name\n1,hu_test\n2,hu_empty\n");
    write(dir, "AlleleCall.csv", "ID,callSetID,alleleID\n1,1,10\n2,1,11\n");
    write(dir, "Allele.csv", "ID,name\n10,0\n11,1\n");
    write(
        dir,
        "AllelePathItem.csv",
        "ID,alleleID,pathItemIndex,sequenceID\n\
         1,10,1,2\n\
         2,10,0,1\n\
         3,10,2,4\n\
         4,11,0,3\n",
    );
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    std::fs::create_dir(dir.join("brca1")).unwrap();
    write_locus(&dir.join("brca1"));
    write(
        dir,
        "tiles.fa",
        ">x.247.abc.r0\nacgtacgtacgtnnnnacgt\n\n>x.247.abd.r0\nacgtacgtac\n",
    );
    write(
        dir,
        "viewer.yaml",
        "loci:\n  - name: BRCA1\n    store: brca1\n    shift_step: 2748\n    path: \"247\"\n\
         sequence_text:\n  - tiles.fa\n",
    );
    dir.join("viewer.yaml")
}

fn rects(list: &DisplayList) -> usize {
    list.count(|c| matches!(c, DrawCommand::Rect { .. }))
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn test_csv_locus_loads_and_lays_out() {
    let dir = tempfile::tempdir().unwrap();
    write_locus(dir.path());
    let store = MemoryStore::from_csv_dir(dir.path()).unwrap();

    let mut graph = LightningGraph::new(LayoutConfig::default(), StyleConfig::default());
    let report = graph
        .init(&store, &LocusConfig::new("BRCA1", 2748, "247"))
        .unwrap();

    assert_eq!(report.components, 4);
    assert_eq!(report.skipped_names, 0);
    // Edge count equals input rows minus dropped rows.
    assert_eq!(report.joins, 3);
    assert_eq!(report.dropped_joins, 1);
    assert_eq!(report.call_sets, 2);
    assert_eq!(report.foreign_path, 0);

    let pos = graph.positions();
    let geometry = LayoutGeometry::new(&LayoutConfig::default());
    assert_eq!(pos[&1].x, 0.0);
    assert_eq!(pos[&4].x - pos[&2].x, geometry.column_width);
    // The seed tile goes above the origin, the plain body below.
    assert!(pos[&3].y < 0.0);
    assert!(pos[&2].y >= 0.0);
}

#[test]
fn test_allele_paths_follow_item_index() {
    let dir = tempfile::tempdir().unwrap();
    write_locus(dir.path());
    let store = MemoryStore::from_csv_dir(dir.path()).unwrap();
    assert_eq!(store.allele_path(10).unwrap(), vec![1, 2, 4]);

    let mut graph = LightningGraph::new(LayoutConfig::default(), StyleConfig::default());
    graph
        .init(&store, &LocusConfig::new("BRCA1", 2748, "247"))
        .unwrap();
    graph.highlight_sample(&store, "hu_test").unwrap();
    let alleles = graph.cached_sample("hu_test").unwrap();
    assert_eq!(alleles.len(), 2);
    assert_eq!(alleles[0].name, "0");
    assert_eq!(alleles[1].path, vec![3]);

    let err = graph.highlight_sample(&store, "hu_empty").unwrap_err();
    assert!(matches!(err, GraphError::QueryEmpty(_)));
    assert_eq!(graph.highlighted_sample(), Some("hu_test"));
}

// ===========================================================================
// Session
// ===========================================================================

#[test]
fn test_session_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig::from_yaml(write_config(dir.path())).unwrap();
    let mut session = Session::from_config(&config).unwrap();

    assert_eq!(session.current_locus(), Some("BRCA1"));
    assert_eq!(session.graph().positions().len(), 4);

    session.handle(&InputEvent::Resize {
        width: 1024.0,
        height: 768.0,
    });
    let mut list = DisplayList::new();
    assert!(session.tick(Instant::now(), &mut list));
    assert!(rects(&list) >= 4);

    session.highlight_sample("hu_test").unwrap();
    assert_eq!(session.controller().status(), "BRCA1 / hu_test");
    let mut highlighted = DisplayList::new();
    assert!(session.tick(Instant::now(), &mut highlighted));
    assert!(rects(&highlighted) > rects(&list));
}

#[test]
fn test_tile_text_appears_when_zoomed_in() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig::from_yaml(write_config(dir.path())).unwrap();
    let mut session = Session::from_config(&config).unwrap();
    session.handle(&InputEvent::Resize {
        width: 1024.0,
        height: 768.0,
    });

    let mut list = DisplayList::new();
    session.tick(Instant::now(), &mut list);
    assert!(!list.texts().any(|t| t.starts_with("acgt")));

    // Zoom in around the first body tile.
    let body = session.graph().positions()[&2].clone();
    let at = session.painter().world_to_dev(body.x, body.y);
    session.handle(&InputEvent::MouseMove { x: at.x, y: at.y });
    session.handle(&InputEvent::MouseWheel { delta: 20.0 });
    assert!(session.painter().zoom() > 0.13);

    let mut list = DisplayList::new();
    session.tick(Instant::now(), &mut list);
    let texts: Vec<&str> = list.texts().collect();
    assert!(texts.contains(&"x.247.abc.r0"));
    assert!(texts.contains(&"acgtacgtacgtnnnnacgt"));
    assert!(texts.contains(&"            nnnn    "));
}

#[test]
fn test_pan_zoom_round_trip_through_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig::from_yaml(write_config(dir.path())).unwrap();
    let mut session = Session::from_config(&config).unwrap();
    session.handle(&InputEvent::Resize {
        width: 800.0,
        height: 600.0,
    });

    session.handle(&InputEvent::MouseMove { x: 300.0, y: 200.0 });
    let anchor = session.painter().dev_to_world(300.0, 200.0);
    let zoom = session.painter().zoom();
    session.handle(&InputEvent::MouseWheel { delta: 4.0 });
    session.handle(&InputEvent::MouseWheel { delta: -4.0 });
    assert!((session.painter().zoom() - zoom).abs() < 1e-12);
    let back = session.painter().dev_to_world(300.0, 200.0);
    assert!((back.x - anchor.x).abs() < 1e-6);
    assert!((back.y - anchor.y).abs() < 1e-6);

    // Drag 100px to the right: the world moves with the pointer.
    session.handle(&InputEvent::MouseDown {
        button: MouseButton::Primary,
        x: 300.0,
        y: 200.0,
    });
    session.handle(&InputEvent::MouseMove { x: 400.0, y: 200.0 });
    session.handle(&InputEvent::MouseUp {
        button: MouseButton::Primary,
        x: 400.0,
        y: 200.0,
    });
    let moved = session.painter().dev_to_world(400.0, 200.0);
    assert!((moved.x - anchor.x).abs() < 1e-6);
}

#[test]
fn test_idle_session_does_not_redraw() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig::from_yaml(write_config(dir.path())).unwrap();
    let mut session = Session::from_config(&config).unwrap();
    let start = Instant::now();

    let mut list = DisplayList::new();
    session.tick(start, &mut list);
    session.tick(start + Duration::from_secs(5), &mut list);
    assert!(!session.needs_redraw());

    let mut list = DisplayList::new();
    assert!(!session.tick(start + Duration::from_secs(6), &mut list));
    assert!(list.is_empty());
}

#[test]
fn test_config_rejects_unknown_locus_store() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "viewer.yaml",
        "loci:\n  - name: BRCA2\n    store: nowhere\n",
    );
    assert!(ViewerConfig::from_yaml(dir.path().join("viewer.yaml")).is_err());
}
