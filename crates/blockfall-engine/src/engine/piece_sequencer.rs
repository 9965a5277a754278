use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Source of the pieces fed to a [`GameField`](crate::GameField).
///
/// Each field owns its sequencer, so games running on different threads
/// never share random state.
pub trait PieceSequencer: fmt::Debug + Send {
    /// Draws the next piece kind.
    fn next_piece(&mut self) -> PieceKind;
}

impl<S> PieceSequencer for Box<S>
where
    S: PieceSequencer + ?Sized,
{
    fn next_piece(&mut self) -> PieceKind {
        (**self).next_piece()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed that initializes the random number generator of the
/// sequencers. The same seed always yields the same piece sequence.
///
/// Serialized as a 32 character hex string.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceSeed, PieceSequencer as _, SequencerKind};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = SequencerKind::Bag.build(seed);
/// let mut b = SequencerKind::Bag.build(seed);
/// assert_eq!(a.next_piece(), b.next_piece());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        serializer.serialize_str(&format!("{num:032x}"))
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let digits_ok = text.len() == 32 && text.bytes().all(|b| b.is_ascii_hexdigit());
        match u128::from_str_radix(&text, 16) {
            Ok(value) if digits_ok => Ok(Self(value.to_be_bytes())),
            _ => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&text),
                &"a seed of 32 hex digits",
            )),
        }
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceSeed {
    /// Low 32 bits of the seed, used to seed the [`LcgSequencer`].
    #[must_use]
    pub fn low_u32(self) -> u32 {
        #[expect(clippy::cast_possible_truncation)]
        let low = u128::from_be_bytes(self.0) as u32;
        low
    }
}

/// Draws every piece independently and uniformly over the seven kinds.
#[derive(Debug, Clone)]
pub struct UniformSequencer {
    rng: Pcg32,
}

impl UniformSequencer {
    #[must_use]
    pub fn new(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl PieceSequencer for UniformSequencer {
    fn next_piece(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// Deals pieces from shuffled bags holding one of each kind.
///
/// Every aligned group of seven consecutive pieces is a permutation of all
/// seven kinds, so no kind is ever absent for more than twelve draws.
#[derive(Debug, Clone)]
pub struct BagSequencer {
    rng: Pcg32,
    bag: Vec<PieceKind>,
}

impl BagSequencer {
    #[must_use]
    pub fn new(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: Vec::with_capacity(PieceKind::LEN),
        }
    }

    fn fill_bag(&mut self) {
        if self.bag.is_empty() {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            // drawn from the back
            self.bag.extend(new_bag.iter().rev());
        }
    }
}

impl PieceSequencer for BagSequencer {
    fn next_piece(&mut self) -> PieceKind {
        self.fill_bag();
        match self.bag.pop() {
            Some(kind) => kind,
            None => unreachable!("bag is refilled before drawing"),
        }
    }
}

/// Reproduces the C library `rand()` linear congruential generator.
///
/// The sequence depends only on the 32-bit seed, which makes headless
/// verification runs comparable across machines and builds. Values map to
/// pieces through [`Self::PIECE_ORDER`], the I, T, O, L, J, Z, S table used by
/// earlier reference runs, so a given seed replays the same game.
#[derive(Debug, Clone)]
pub struct LcgSequencer {
    state: u32,
}

impl LcgSequencer {
    const MULTIPLIER: u32 = 1_103_515_245;
    const INCREMENT: u32 = 12_345;

    /// Piece for each residue of the generated value modulo 7.
    pub const PIECE_ORDER: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::T,
        PieceKind::O,
        PieceKind::L,
        PieceKind::J,
        PieceKind::Z,
        PieceKind::S,
    ];

    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns a value in `0..=0x7fff`.
    pub fn next_value(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        (self.state >> 16) & 0x7fff
    }
}

impl PieceSequencer for LcgSequencer {
    fn next_piece(&mut self) -> PieceKind {
        let value = self.next_value() as usize;
        Self::PIECE_ORDER[value % PieceKind::LEN]
    }
}

/// Selects one of the built-in sequencers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequencerKind {
    Uniform,
    #[default]
    Bag,
    Lcg,
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("unknown sequencer `{name}`, expected one of: uniform, bag, lcg")]
pub struct UnknownSequencerError {
    pub name: String,
}

impl FromStr for SequencerKind {
    type Err = UnknownSequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "bag" => Ok(Self::Bag),
            "lcg" => Ok(Self::Lcg),
            _ => Err(UnknownSequencerError { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for SequencerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uniform => "uniform",
            Self::Bag => "bag",
            Self::Lcg => "lcg",
        };
        f.write_str(name)
    }
}

impl SequencerKind {
    pub const ALL: [Self; 3] = [Self::Uniform, Self::Bag, Self::Lcg];

    /// Creates a sequencer of this kind.
    ///
    /// The LCG sequencer only uses the low 32 bits of the seed.
    #[must_use]
    pub fn build(self, seed: PieceSeed) -> Box<dyn PieceSequencer> {
        match self {
            Self::Uniform => Box::new(UniformSequencer::new(seed)),
            Self::Bag => Box::new(BagSequencer::new(seed)),
            Self::Lcg => Box::new(LcgSequencer::new(seed.low_u32())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn draw(sequencer: &mut dyn PieceSequencer, n: usize) -> Vec<PieceKind> {
        (0..n).map(|_| sequencer.next_piece()).collect()
    }

    #[test]
    fn test_bag_sequencer_deals_permutations() {
        let mut sequencer = BagSequencer::new(rand::rng().random());
        for _ in 0..10 {
            let bag: HashSet<_> = draw(&mut sequencer, PieceKind::LEN).into_iter().collect();
            assert_eq!(bag.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_uniform_sequencer_yields_every_kind() {
        let mut sequencer = UniformSequencer::new(PieceSeed([7; 16]));
        let seen: HashSet<_> = draw(&mut sequencer, 1000).into_iter().collect();
        assert_eq!(seen.len(), PieceKind::LEN);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed = PieceSeed::from(0x1234_5678_9abc_def0_u64);
        for kind in SequencerKind::ALL {
            let mut a = kind.build(seed);
            let mut b = kind.build(seed);
            assert_eq!(draw(&mut a, 50), draw(&mut b, 50), "{kind}");
        }
    }

    #[test]
    fn test_lcg_matches_c_rand() {
        // glibc TYPE_0 rand() with srand(1)
        let mut lcg = LcgSequencer::new(1);
        let values: Vec<_> = (0..3).map(|_| lcg.next_value()).collect();
        assert_eq!(values, [16838, 5758, 10113]);

        let mut lcg = LcgSequencer::new(1);
        assert_eq!(
            draw(&mut lcg, 3),
            [
                LcgSequencer::PIECE_ORDER[16838 % 7],
                LcgSequencer::PIECE_ORDER[5758 % 7],
                LcgSequencer::PIECE_ORDER[10113 % 7],
            ]
        );
    }

    #[test]
    fn test_lcg_reference_sequence_for_verify_seed() {
        use PieceKind::{J, L, S, T, Z};
        let mut lcg = LcgSequencer::new(12345);
        assert_eq!(draw(&mut lcg, 10), [S, S, J, Z, T, T, T, Z, L, J]);
    }

    #[test]
    fn test_lcg_order_covers_every_kind() {
        let kinds: HashSet<_> = LcgSequencer::PIECE_ORDER.into_iter().collect();
        assert_eq!(kinds.len(), PieceKind::LEN);
    }

    #[test]
    fn test_lcg_seed_uses_low_bits() {
        let seed = PieceSeed::from(0x1_0000_0005_u64);
        assert_eq!(seed.low_u32(), 5);
        let mut a = SequencerKind::Lcg.build(seed);
        let mut b = LcgSequencer::new(5);
        assert_eq!(draw(&mut a, 20), draw(&mut b, 20));
    }

    #[test]
    fn test_sequencer_kind_from_str() {
        assert_eq!("bag".parse::<SequencerKind>().unwrap(), SequencerKind::Bag);
        assert_eq!("LCG".parse::<SequencerKind>().unwrap(), SequencerKind::Lcg);
        let err = "random".parse::<SequencerKind>().unwrap_err();
        assert!(err.to_string().contains("random"));
        for kind in SequencerKind::ALL {
            assert_eq!(kind.to_string().parse::<SequencerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_seed_serializes_as_hex() {
        let seed = PieceSeed::from(0xdead_beef_u64);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"000000000000000000000000deadbeef\"");
        assert_eq!(serde_json::from_str::<PieceSeed>(&json).unwrap(), seed);

        let random: PieceSeed = rand::rng().random();
        let json = serde_json::to_string(&random).unwrap();
        assert_eq!(serde_json::from_str::<PieceSeed>(&json).unwrap(), random);
    }

    #[test]
    fn test_seed_rejects_malformed_hex() {
        for json in [
            "\"\"",
            "\"deadbeef\"",
            "\"+00000000000000000000000deadbeef\"",
            "\"zz0000000000000000000000deadbeef\"",
        ] {
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("32 hex digits"), "{json}");
        }
    }
}
