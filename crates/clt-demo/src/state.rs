use crate::actions::{self, Action};
use crate::cache::Cache;
use crate::effects::{self, Effect};
use crate::store::Store;

pub struct State {
    pub store: Store,
    pub cache: Cache,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
}

impl State {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            cache: Cache::new(),
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(&mut self.store, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self) {
        let effects = std::mem::take(&mut self.effect_queue);
        for effect in effects {
            effects::run(&mut self.store, effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use dice::{Face, presets};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_actions_wait_for_flush() {
        let store = Store::with_rng(
            Settings::default(),
            presets::FAIR,
            2,
            StdRng::seed_from_u64(5),
        );
        let mut state = State::new(store);
        state.dispatch(Action::ToggleLock {
            face: Face::new(6).unwrap(),
        });
        state.dispatch(Action::StepDice { delta: 1 });
        assert_eq!(*state.store.dice.get(), 2);

        state.flush_actions();
        assert_eq!(*state.store.dice.get(), 3);
        assert!(state.store.model.get().is_locked(Face::new(6).unwrap()));
    }

    #[test]
    fn test_effects_run_after_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = Store::with_rng(
            Settings::default(),
            presets::VALLEY,
            5,
            StdRng::seed_from_u64(5),
        );
        let mut state = State::new(store);

        state.dispatch(Action::SaveToFile { path: path.clone() });
        state.flush_actions();
        assert!(!path.exists());

        state.flush_effects();
        assert!(path.exists());
        assert!(state.store.error_message.is_none());
    }
}
