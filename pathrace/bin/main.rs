use pathrace::{maze::generate_connected, Algorithm, PathFinder, PathFinderState};

fn main() -> Result<(), anyhow::Error> {
    let mut rng = rand::thread_rng();
    let map = generate_connected(21, 41, &mut rng);

    println!("{}", map);

    for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
        let (res, visited) = PathFinder::new(algorithm, map.start(), map.goal(), &map).finish(&map);

        match res {
            PathFinderState::PathFound(result) => {
                println!(
                    "{}: {} cells, {} expanded",
                    algorithm,
                    result.path.len(),
                    result.expanded
                );
                println!("{}", visited);
            }
            state => anyhow::bail!("{} did not find a path: {:?}", algorithm, state),
        }
    }

    Ok(())
}
