use narwhal::algo::collision::overlaps;
use narwhal::algo::convergence::SETTLE_TOLERANCE;
use narwhal::controller::settle;
use narwhal::graph::store::seed_radius;
use narwhal::{NodeStore, SimulationParams, Vec2, parse_edges, unique_names};

fn store_from(text: &str, width: f64, height: f64) -> NodeStore {
    let edges = parse_edges(text);
    let names = unique_names(&edges);
    let mut store = NodeStore::default();
    store.set_edges(edges);
    store.reconcile(&names, width, height);
    store
}

#[test]
fn chain_is_seeded_on_the_viewport_circle() {
    let store = store_from("A => B\nB => C", 800.0, 600.0);
    assert_eq!(store.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(store.edges().len(), 2);

    let r = seed_radius(800.0, 600.0);
    assert!((r - 210.0).abs() < 1e-9);
    for node in store.nodes() {
        assert!((node.position.norm() - r).abs() < 1e-9);
        assert_eq!(node.velocity, Vec2::zeros());
    }
    let a = store.node("A").expect("A").position;
    assert!(a.x.abs() < 1e-9);
    assert!((a.y + r).abs() < 1e-9);
}

#[test]
fn small_viewports_use_the_minimum_seed_radius() {
    let store = store_from("A => B", 100.0, 100.0);
    for node in store.nodes() {
        assert!((node.position.norm() - 60.0).abs() < 1e-9);
    }
}

#[test]
fn three_room_chain_converges_without_overlaps() {
    let params = SimulationParams::default();
    let mut store = store_from("A => B\nB => C", 800.0, 600.0);

    let settled = settle(&mut store, &params, 10_000);
    assert!(settled.converged, "did not converge in {} ticks", settled.ticks);

    let nodes: Vec<_> = store.nodes().cloned().collect();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            assert!(!overlaps(&nodes[i], &nodes[j]), "{} overlaps {}", nodes[i].name, nodes[j].name);
        }
    }
    for (a, b) in [("A", "B"), ("B", "C")] {
        let (a, b) = (store.node(a).expect("a"), store.node(b).expect("b"));
        let dist = (b.position - a.position).norm();
        assert!(dist <= a.radius() + b.radius() + params.target_gap + SETTLE_TOLERANCE);
    }
    for node in store.nodes() {
        assert!(node.speed() < params.stop_vel);
    }
}

#[test]
fn disconnected_rooms_spread_apart() {
    let params = SimulationParams::default();
    let mut store = store_from("A => B\nC => D", 800.0, 600.0);
    let settled = settle(&mut store, &params, 20_000);
    assert!(settled.converged);

    let a = store.node("A").expect("A");
    let c = store.node("C").expect("C");
    let dist = (c.position - a.position).norm();
    assert!(dist >= a.radius() + c.radius() + params.min_gap - SETTLE_TOLERANCE);
}

#[test]
fn reconcile_with_same_names_keeps_state() {
    let mut store = store_from("A => B\nB => C", 800.0, 600.0);
    settle(&mut store, &SimulationParams::default(), 25);
    let before: Vec<_> = store.nodes().cloned().collect();

    let names = unique_names(store.edges());
    let report = store.reconcile(&names, 800.0, 600.0);
    assert!(report.is_empty());
    let report = store.reconcile(&names, 320.0, 240.0);
    assert!(report.is_empty());
    assert_eq!(store.nodes().cloned().collect::<Vec<_>>(), before);
}

#[test]
fn edits_keep_surviving_rooms_in_place() {
    let mut store = store_from("A => B", 800.0, 600.0);
    store.node_mut("A").expect("A").position = Vec2::new(5.0, 7.0);

    let edges = parse_edges("A => C");
    let names = unique_names(&edges);
    store.set_edges(edges);
    let report = store.reconcile(&names, 800.0, 600.0);

    assert_eq!(report.added, vec!["C"]);
    assert_eq!(report.removed, vec!["B"]);
    assert_eq!(store.node("A").expect("A").position, Vec2::new(5.0, 7.0));
    assert!(store.is_connected("C", "A"));
}

#[test]
fn self_edge_yields_one_isolated_room() {
    let params = SimulationParams::default();
    let mut store = store_from("A => A", 800.0, 600.0);
    assert_eq!(store.len(), 1);
    let settled = settle(&mut store, &params, 10_000);
    assert!(settled.converged);
}

const VIEWPORTS: [(f64, f64); 4] = [(100.0, 100.0), (320.0, 240.0), (800.0, 600.0), (1920.0, 1080.0)];

fn chain(n: usize) -> String {
    let names: Vec<String> = (0..n).map(|i| ((b'A' + i as u8) as char).to_string()).collect();
    names
        .windows(2)
        .map(|w| format!("{} => {}", w[0], w[1]))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_settles(store: &mut NodeStore, label: &str) {
    let settled = settle(store, &SimulationParams::default(), 20_000);
    assert!(settled.converged, "{label}: not settled after {} ticks", settled.ticks);
}

#[test]
fn default_params_settle_common_shapes_on_every_viewport() {
    let shapes = [
        ("chain3", chain(3)),
        ("chain6", chain(6)),
        ("chain8", chain(8)),
        ("cycle3", "A => B\nB => C\nC => A".to_string()),
        ("cycle4", "A => B\nB => C\nC => D\nD => A".to_string()),
        ("cycle6", "A => B\nB => C\nC => D\nD => E\nE => F\nF => A".to_string()),
        ("star5", "A => B\nA => C\nA => D\nA => E".to_string()),
        ("pairs", "A => B\nC => D".to_string()),
        ("single", "A => A".to_string()),
    ];
    for (name, text) in &shapes {
        for (w, h) in VIEWPORTS {
            let mut store = store_from(text, w, h);
            assert_settles(&mut store, &format!("{name} in {w}x{h}"));
        }
    }
}

#[test]
fn resized_rooms_still_settle() {
    for (w, h) in VIEWPORTS {
        // Size known before the room appears.
        let edges = parse_edges(&chain(3));
        let names = unique_names(&edges);
        let mut store = NodeStore::default();
        store.set_size("A", 400.0, 400.0);
        store.set_edges(edges);
        store.reconcile(&names, w, h);
        assert_settles(&mut store, &format!("chain3 with big A in {w}x{h}"));

        // Size edited on a settled layout.
        for (text, room, size) in [
            (chain(3), "A", (400.0, 400.0)),
            (chain(3), "B", (400.0, 400.0)),
            (chain(5), "C", (20.0, 300.0)),
            ("A => B\nB => C\nC => D\nD => A".to_string(), "A", (400.0, 400.0)),
            ("A => B\nA => C\nA => D".to_string(), "A", (300.0, 40.0)),
        ] {
            let mut store = store_from(&text, w, h);
            assert_settles(&mut store, "before resize");
            assert!(store.set_size(room, size.0, size.1));
            assert_settles(&mut store, &format!("{room} resized to {size:?} in {w}x{h}"));
        }
    }
}
