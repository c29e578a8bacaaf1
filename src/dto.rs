use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Gene columns in the order the colony table displays them.
pub const GENE_COLUMNS: [&str; 4] = ["vitality", "sturdiness", "agility", "strength"];

/// One creature row as served by the colony endpoint. The `private_ID`
/// spelling is part of the wire contract.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TorbRecord {
    pub id: i32,
    #[serde(rename = "private_ID")]
    pub private_id: i32,
    pub generation: i32,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub genes: HashMap<String, [String; 2]>,
    pub action_desc: String,
    pub status: String,
    pub fertile: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TorbListResponse {
    pub torbs: Vec<TorbRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadyStatus {
    pub ready: bool,
}
