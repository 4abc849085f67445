use hashbrown::HashMap;

use crate::types::InstrumentId;

/// Key to ids holding that key, in insert order.
pub type VecIndex<K> = HashMap<K, Vec<InstrumentId>>;

pub(crate) fn remove_from_vec_index(ids: &mut Vec<InstrumentId>, id: InstrumentId) {
    if let Some(pos) = ids.iter().position(|x| *x == id) {
        ids.remove(pos);
    }
}
