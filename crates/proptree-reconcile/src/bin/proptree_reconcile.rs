//! `proptree-reconcile` — reconcile every object in a scene document.
//!
//! Usage:
//!   proptree-reconcile < scene.json
//!
//! The scene is read from stdin. One line is printed per object with the
//! number of overrides reverted, followed by an aggregate summary.

use proptree_reconcile::{reconcile_all, MemoryHost, Scene};
use std::io::{self, Read};

fn main() {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let scene = match Scene::from_json(&buf) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut host = MemoryHost::new();
    if let Err(e) = scene.load_into(&mut host) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let ids: Vec<_> = host.object_ids().collect();
    let report = reconcile_all(&mut host, ids);
    for (id, outcome) in &report.per_object {
        match outcome {
            Ok(count) => println!("{}: reverted {count}", host.name(*id)),
            Err(e) => println!("{}: failed ({e})", host.name(*id)),
        }
    }
    println!("{report}");
}
