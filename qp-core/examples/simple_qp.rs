//! Small QP example for the dual active-set solver.
//!
//! Solves:
//!   minimize    (x1 - 2)^2 + (x2 - 1)^2
//!   subject to  x1 + x2 <= 2
//!               x1, x2 >= 0
//!
//! Optimal solution: x1 = 1.5, x2 = 0.5, objective = -4.5 (constant 5 dropped)

use nalgebra::DMatrix;
use qp_core::linalg::sparse;
use qp_core::{solve, ConeSpec, ProblemData, SolverSettings};

fn main() {
    println!("qp-core - Simple QP Example");
    println!("===========================");

    // In standard form:
    //   minimize (1/2) x^T P x + q^T x
    //   subject to A x + s = b, s ∈ K
    //
    // P = 2I, q = [-4, -2]
    // Constraints (m=3), all NonNeg:
    //   1.  x1 + x2 + s1 = 2
    //   2. -x1 + s2 = 0       (x1 >= 0)
    //   3. -x2 + s3 = 0       (x2 >= 0)
    let prob = ProblemData {
        P: DMatrix::from_diagonal_element(2, 2, 2.0),
        q: vec![-4.0, -2.0],
        A: sparse::from_triplets(
            3,
            2,
            vec![
                (0, 0, 1.0),
                (0, 1, 1.0),  // Row 0: x1 + x2
                (1, 0, -1.0), // Row 1: -x1
                (2, 1, -1.0), // Row 2: -x2
            ],
        ),
        b: vec![2.0, 0.0, 0.0],
        cones: vec![ConeSpec::NonNeg { dim: 3 }],
    };

    let settings = SolverSettings {
        verbose: true,
        ..Default::default()
    };

    match solve(&prob, &settings) {
        Ok(result) => {
            println!("\n=== Solution ===");
            println!("Status: {}", result.status);
            println!("x1 = {:.6}", result.x[0]);
            println!("x2 = {:.6}", result.x[1]);
            println!("s  = {:?}", result.s);
            println!("z  = {:?}", result.z);
            println!("Active rows: {:?}", result.active);
            println!("Objective value: {:.6}", result.obj_val);
            println!(
                "Iterations: {} ({} adds, {} drops)",
                result.info.iters, result.info.adds, result.info.drops
            );
        }
        Err(e) => {
            eprintln!("Solver failed: {}", e);
            std::process::exit(1);
        }
    }
}
