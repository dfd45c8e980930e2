use std::process::Command;

use tracing::{debug, info, warn};

use crate::{parse_sequence, CubeError, CubeState, Move, Result};

/// Black-box cube solver: canonical facelet string in, move notation out.
pub trait SolverAdapter {
    fn solve(&self, facelets: &str) -> Result<String>;
}

impl<F> SolverAdapter for F
where
    F: Fn(&str) -> Result<String>,
{
    fn solve(&self, facelets: &str) -> Result<String> {
        self(facelets)
    }
}

/// Runs an external solver program with the facelet string as its last
/// argument and reads the solution from stdout.
#[derive(Debug, Clone)]
pub struct CommandSolver {
    program: String,
    args: Vec<String>,
}

impl CommandSolver {
    /// Splits a shell-like command line on whitespace.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CubeError::SolverFailure("empty solver command".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl SolverAdapter for CommandSolver {
    fn solve(&self, facelets: &str) -> Result<String> {
        debug!(program = %self.program, "invoking solver");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(facelets)
            .output()
            .map_err(|err| {
                CubeError::SolverFailure(format!("could not run `{}`: {err}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CubeError::SolverFailure(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.starts_with("Error") {
            return Err(CubeError::SolverFailure(stdout));
        }
        Ok(stdout)
    }
}

/// Serializes `state`, asks `solver` for a solution and parses it.
///
/// Solver errors of any kind surface as [`CubeError::SolverFailure`]; the
/// state is only borrowed, so a failure never costs a rescan. A solution
/// with an unknown token is an integrity error and nothing is returned.
pub fn solve_moves(solver: &dyn SolverAdapter, state: &CubeState) -> Result<Vec<Move>> {
    let facelets = state.to_facelets();
    let solution = solver.solve(&facelets).map_err(|err| match err {
        CubeError::SolverFailure(_) => err,
        other => CubeError::SolverFailure(other.to_string()),
    });
    let solution = match solution {
        Ok(solution) => solution,
        Err(err) => {
            warn!(%err, "solver rejected the cube");
            return Err(err);
        }
    };

    if solution.trim().is_empty() && !state.is_solved() {
        return Err(CubeError::SolverFailure(
            "solver returned no solution".to_string(),
        ));
    }

    let moves = parse_sequence(&solution)?;
    info!(moves = moves.len(), %solution, "solution received");
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaceletLabel;

    #[test]
    fn closures_act_as_solvers() {
        let solver = |facelets: &str| -> Result<String> {
            assert_eq!(facelets.len(), 54);
            Ok("R U R' U'".to_string())
        };
        let moves = solve_moves(&solver, &CubeState::solved()).unwrap();
        assert_eq!(moves.len(), 4);
        assert_eq!(moves[0].face, FaceletLabel::R);
    }

    #[test]
    fn solved_cube_yields_no_moves() {
        let solver = |_: &str| -> Result<String> { Ok(String::new()) };
        assert!(solve_moves(&solver, &CubeState::solved()).unwrap().is_empty());
    }

    #[test]
    fn empty_solution_for_scrambled_cube_is_a_failure() {
        let state = CubeState::from_facelets(
            "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD",
        )
        .unwrap();
        let solver = |_: &str| -> Result<String> { Ok(String::new()) };
        let err = solve_moves(&solver, &state).unwrap_err();
        assert!(matches!(err, CubeError::SolverFailure(_)));
    }

    #[test]
    fn other_errors_become_solver_failures() {
        let solver = |_: &str| -> Result<String> { Err(CubeError::msg("timeout")) };
        let err = solve_moves(&solver, &CubeState::solved()).unwrap_err();
        assert!(matches!(err, CubeError::SolverFailure(ref m) if m == "timeout"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_tokens_are_fatal() {
        let solver = |_: &str| -> Result<String> { Ok("R M U".to_string()) };
        let err = solve_moves(&solver, &CubeState::solved()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_program_is_a_solver_failure() {
        let solver = CommandSolver::from_command_line("cube-replay-no-such-solver").unwrap();
        let err = solver.solve("U").unwrap_err();
        assert!(matches!(err, CubeError::SolverFailure(_)));
    }

    #[test]
    fn command_line_is_split_into_program_and_args() {
        assert!(CommandSolver::from_command_line("   ").is_err());
        let solver = CommandSolver::from_command_line("python3 -m kociemba").unwrap();
        assert_eq!(solver.program, "python3");
        assert_eq!(solver.args, ["-m", "kociemba"]);
    }
}
