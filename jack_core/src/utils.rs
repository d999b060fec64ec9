use crate::player::{Player, PlayerId};

pub trait VecExtensions<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool;
}

impl<T> VecExtensions<T> for Vec<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter()
            .position(predicate)
            .map(|index| self.remove(index))
    }
}

pub trait PlayerSliceExtensions {
    fn by_id(&self, id: PlayerId) -> Option<&Player>;
    fn by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player>;
    fn alive(&self) -> impl Iterator<Item = &Player>;
}

impl PlayerSliceExtensions for [Player] {
    fn by_id(&self, id: PlayerId) -> Option<&Player> {
        self.iter().find(|p| p.id() == id)
    }

    fn by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.iter_mut().find(|p| p.id() == id)
    }

    fn alive(&self) -> impl Iterator<Item = &Player> {
        self.iter().filter(|p| p.is_alive())
    }
}
