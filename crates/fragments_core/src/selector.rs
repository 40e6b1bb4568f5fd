use crate::error::AppError;
use crate::model::Task;
use rand::Rng;

/// Picks one pending task uniformly at random and returns its index in
/// `tasks`.
///
/// The pending subset is Fisher-Yates shuffled and the head is taken, so
/// every pending task is equally likely. Tasks in any other state are never
/// chosen.
pub fn choose_pending<R: Rng>(tasks: &[Task], rng: &mut R) -> Result<usize, AppError> {
    let mut candidates: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.is_pending())
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        return Err(AppError::NoEligibleTask);
    }

    for i in (1..candidates.len()).rev() {
        let j = rng.random_range(0..=i);
        candidates.swap(i, j);
    }

    Ok(candidates[0])
}
