use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use stepmazes::generators::{BuilderKind, MazeBuilder};
use stepmazes::grid::{Grid, WeightRange};
use stepmazes::pathing::{MazeSolver, SolverKind};
use stepmazes::session::Route;
use stepmazes::units::{ColumnsCount, RowsCount};

fn large_maze() -> Grid {
    let mut g = Grid::new(ColumnsCount(350), RowsCount(350)).unwrap();
    MazeBuilder::from_seed(&mut g, BuilderKind::RecursiveBacktracker, 7).run_to_completion(&mut g);
    g.randomize_weights(&mut XorShiftRng::seed_from_u64(7), WeightRange::default());
    g
}

fn bench_solver(c: &mut Criterion, name: &str, kind: SolverKind) {
    c.bench_function(name, |b| {
        let maze = large_maze();
        let route = Route::new(0, maze.size() - 1, &maze).unwrap();
        b.iter(|| {
            let mut g = maze.clone();
            let mut solver = MazeSolver::from_seed(&mut g, kind, route, 1);
            solver.run_to_goal(&mut g).map(|path| path.len())
        })
    });
}

fn bench_depth_first(c: &mut Criterion) {
    bench_solver(c, "depth_first_350", SolverKind::DepthFirst);
}

fn bench_breadth_first(c: &mut Criterion) {
    bench_solver(c, "breadth_first_350", SolverKind::BreadthFirst);
}

fn bench_dijkstra(c: &mut Criterion) {
    bench_solver(c, "dijkstra_350", SolverKind::Dijkstra);
}

fn bench_astar(c: &mut Criterion) {
    bench_solver(c, "astar_350", SolverKind::AStar);
}

criterion_group!(benches, bench_depth_first, bench_breadth_first, bench_dijkstra, bench_astar);
criterion_main!(benches);
