//! Display attributes derived from an identifier.

use printboard_core::DerivationError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub const ADJECTIVES: &[&str] = &[
    "Quiet", "Brave", "Clever", "Gentle", "Swift", "Curious", "Silent", "Bright",
    "Calm", "Daring", "Eager", "Fierce", "Golden", "Hidden", "Jolly", "Keen",
    "Lucky", "Mellow", "Nimble", "Proud", "Rapid", "Sleepy", "Tiny", "Witty",
    "Amber", "Bold", "Cosmic", "Dusty", "Electric", "Frosty", "Glowing", "Hazy",
    "Icy", "Jade", "Lunar", "Misty", "Noble", "Ochre", "Polar", "Rustic",
    "Scarlet", "Solar", "Stormy", "Velvet", "Wandering", "Wild", "Zesty", "Ancient",
    "Crimson", "Drifting", "Feathered", "Gilded", "Humble", "Lively", "Mossy", "Patient",
    "Restless", "Shy", "Sturdy", "Sunny", "Twilight", "Vivid", "Whispering", "Woolly",
];

pub const NOUNS: &[&str] = &[
    "Falcon", "Otter", "Badger", "Heron", "Lynx", "Fox", "Owl", "Wolf",
    "Marten", "Panda", "Raven", "Sparrow", "Tiger", "Walrus", "Yak", "Zebra",
    "Beaver", "Camel", "Dolphin", "Eagle", "Ferret", "Gecko", "Hare", "Ibis",
    "Jaguar", "Koala", "Lemur", "Moose", "Newt", "Ocelot", "Puffin", "Quokka",
    "Robin", "Salmon", "Toucan", "Urchin", "Viper", "Wombat", "Bison", "Crane",
    "Dingo", "Egret", "Finch", "Gazelle", "Hedgehog", "Iguana", "Jackal", "Kestrel",
    "Llama", "Magpie", "Narwhal", "Oriole", "Pelican", "Rook", "Seal", "Tapir",
    "Vole", "Weasel", "Albatross", "Bobcat", "Cougar", "Dormouse", "Kingfisher", "Starling",
];

pub const EMOJIS: &[&str] = &[
    "🦊", "🐼", "🦉", "🐙", "🦄", "🐢", "🦋", "🐝",
    "🦁", "🐯", "🐨", "🐸", "🦜", "🦩", "🐧", "🐳",
    "🦈", "🐬", "🦦", "🦥", "🦔", "🐿️", "🦇", "🐺",
    "🦝", "🐻", "🐰", "🦒", "🦓", "🦘", "🐘", "🦛",
    "🐊", "🦎", "🐍", "🦀", "🐞", "🦚", "🦢", "🐡",
];

/// `<Adjective> <Noun>` chosen by a generator seeded from the id's bytes.
/// Indices are sampled as `u32` so the result does not depend on the
/// target's pointer width.
pub fn moniker_for(id: &Uuid) -> String {
    let bytes = id.as_bytes();
    let mut seed = [0u8; 32];
    seed[..16].copy_from_slice(bytes);
    seed[16..].copy_from_slice(bytes);
    let mut rng = ChaCha8Rng::from_seed(seed);
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len() as u32) as usize];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len() as u32) as usize];
    format!("{} {}", adjective, noun)
}

/// Glyph at `(first 8 hex chars of id as u32) mod EMOJIS.len()`.
pub fn emoji_for(id: &str) -> Result<&'static str, DerivationError> {
    let head = id
        .get(..8)
        .ok_or_else(|| DerivationError::InvalidId(id.to_string()))?;
    let value = u32::from_str_radix(head, 16)
        .map_err(|_| DerivationError::InvalidId(id.to_string()))?;
    Ok(EMOJIS[value as usize % EMOJIS.len()])
}
