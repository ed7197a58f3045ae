// End-to-end checks of seeding, growth and motion on small maps.
use hexplates::config::Params;
use hexplates::geometry::{Orientation, Point};
use hexplates::hexagon::{COLORED, FILLED, SHOW_CENTER};
use hexplates::plates::{NeighborLookup, Neighbors, PALETTE, SeedError, grow_step};
use hexplates::session::{Phase, Session, SessionError};

fn two_plate_params() -> Params {
    Params {
        image_width: 100.0,
        image_height: 100.0,
        hex_size: 10.0,
        orientation: Orientation::Vertical,
        plate_count: 2,
        ..Default::default()
    }
}

#[test]
fn test_two_seeds_fill_the_map() {
    let mut session = Session::new(two_plate_params()).unwrap();
    let plates = session
        .seed_plates_at(&[Point::new(20.0, 20.0), Point::new(80.0, 80.0)])
        .unwrap()
        .to_vec();
    assert_eq!(plates.len(), 2);

    for (i, plate) in plates.iter().enumerate() {
        let seed = session.grid().get(plate.cells[0]).unwrap();
        assert_eq!(seed.color(), PALETTE[i]);
        assert_eq!(seed.state() & (FILLED | COLORED | SHOW_CENTER), FILLED | COLORED | SHOW_CENTER);
        assert!(seed.contains(plate.center));
    }
    assert_eq!(session.grid().filled_count(), 2);

    let outcome = session.run_to_convergence().unwrap();
    println!("converged in {} steps over {} cells", outcome.steps, session.grid().len());
    assert!(outcome.converged);
    assert_eq!(session.phase(), Phase::Converged);
    assert!(session.grid().cells().iter().all(|h| h.is_filled()));
    assert!(session.plates().iter().all(|p| p.is_stable()));
}

#[test]
fn test_plates_partition_the_grid() {
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let mut session = Session::new(Params {
            image_width: 300.0,
            image_height: 220.0,
            hex_size: 12.0,
            orientation,
            plate_count: 5,
            seed: 7,
            ..Default::default()
        })
        .unwrap();
        session.seed_plates().unwrap();
        session.run_to_convergence().unwrap();

        let grid = session.grid();
        let mut owners = vec![0u32; grid.len()];
        for plate in session.plates() {
            for &cell in &plate.cells {
                assert_eq!(owners[cell as usize], 0, "cell {cell} claimed twice");
                owners[cell as usize] = plate.index;
                assert_eq!(grid.get(cell).unwrap().color(), plate.color);
            }
        }
        assert!(owners.iter().all(|&o| o != 0), "{orientation:?}: unowned cell");
    }
}

#[test]
fn test_growth_is_idempotent_after_convergence() {
    let mut session = Session::new(two_plate_params()).unwrap();
    session.seed_plates().unwrap();
    session.run_to_convergence().unwrap();
    assert!(session.plates().iter().all(|p| p.is_stable()));

    // Re-run the engine itself on the converged state.
    let mut grid = session.grid().clone();
    let mut plates = session.plates().to_vec();
    let neighbors = Neighbors::new(&grid, NeighborLookup::Scan);
    let before: Vec<_> = grid.cells().iter().map(|h| (h.state(), h.color())).collect();

    let claimed = grow_step(&mut grid, &mut plates, &neighbors);
    assert_eq!(claimed, vec![0, 0]);
    assert!(plates.iter().all(|p| p.frontier.is_empty()));
    let after: Vec<_> = grid.cells().iter().map(|h| (h.state(), h.color())).collect();
    assert_eq!(before, after);
    for (old, new) in session.plates().iter().zip(&plates) {
        assert_eq!(old.cells, new.cells);
    }

    // Frontiers were only emptied by the final step; restarting growth from
    // every claimed cell still finds nothing unowned.
    for plate in plates.iter_mut() {
        plate.frontier = plate.cells.clone();
    }
    assert_eq!(grow_step(&mut grid, &mut plates, &neighbors), vec![0, 0]);
    assert_eq!(grid.filled_count(), grid.len());
}

#[test]
fn test_lookup_strategies_agree() {
    let run = |lookup| {
        let mut session = Session::new(Params {
            image_width: 240.0,
            image_height: 180.0,
            hex_size: 9.0,
            plate_count: 4,
            neighbor_lookup: lookup,
            seed: 99,
            ..Default::default()
        })
        .unwrap();
        session.seed_plates().unwrap();
        let outcome = session.run_to_convergence().unwrap();
        let colors: Vec<_> = session.grid().cells().iter().map(|h| h.color()).collect();
        (outcome, colors)
    };
    assert_eq!(run(NeighborLookup::Scan), run(NeighborLookup::Indexed));
}

#[test]
fn test_margin_rejects_every_seed() {
    let mut session = Session::new(Params {
        image_width: 60.0,
        image_height: 60.0,
        hex_size: 50.0,
        max_seed_attempts: 500,
        ..two_plate_params()
    })
    .unwrap();

    match session.seed_plates() {
        Err(SessionError::Seed(SeedError::Exhausted { plate, attempts })) => {
            assert_eq!(plate, 1);
            assert_eq!(attempts, 500);
        }
        other => panic!("expected exhausted seeding, got {:?}", other.map(|p| p.len())),
    }
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.grid().filled_count(), 0);
}

#[test]
fn test_generate_end_to_end() {
    let params = Params {
        image_width: 400.0,
        image_height: 300.0,
        hex_size: 12.0,
        plate_count: 6,
        seed: 2024,
        ..Default::default()
    };
    let (session, timings) = hexplates::generate(&params).unwrap();

    for t in &timings {
        println!("{:20} {:8.1} ms", t.name, t.ms);
    }
    let names: Vec<_> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, ["grid", "plate_seed", "plate_grow", "plate_motion", "TOTAL"]);

    assert_eq!(session.phase(), Phase::Moving);
    assert_eq!(session.plates().len(), 6);
    assert!(session.plates().iter().all(|p| p.velocity.is_some()));
    assert_eq!(session.grid().filled_count(), session.grid().len());

    // Same parameters, same map.
    let (again, _) = hexplates::generate(&params).unwrap();
    let colors = |s: &Session| s.grid().cells().iter().map(|h| h.color()).collect::<Vec<_>>();
    assert_eq!(colors(&session), colors(&again));
    assert_eq!(
        session.plates().iter().map(|p| p.velocity).collect::<Vec<_>>(),
        again.plates().iter().map(|p| p.velocity).collect::<Vec<_>>()
    );
}

#[test]
fn test_fit_is_reported() {
    let session = Session::new(Params {
        image_width: 1000.0,
        image_height: 700.0,
        ..Default::default()
    })
    .unwrap();
    let fit = session.fit();
    assert_eq!(fit.requested_width, 1000.0);
    assert_eq!(fit.requested_height, 700.0);
    assert!(fit.width >= 1000.0 - 1e-3 && fit.height >= 700.0 - 1e-3);
}
