use std::fmt;

use rcp_plugin_sys as sys;

use crate::byte_order::MemoryOrder;

/// One of the fourteen digital inputs of a standard pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    DpadRight,
    DpadLeft,
    DpadDown,
    DpadUp,
    Start,
    Z,
    B,
    A,
    CRight,
    CLeft,
    CDown,
    CUp,
    R,
    L,
}

impl Button {
    pub const ALL: [Self; 14] = [
        Self::DpadRight,
        Self::DpadLeft,
        Self::DpadDown,
        Self::DpadUp,
        Self::Start,
        Self::Z,
        Self::B,
        Self::A,
        Self::CRight,
        Self::CLeft,
        Self::CDown,
        Self::CUp,
        Self::R,
        Self::L,
    ];

    /// Position inside [`ButtonSet`], which uses swapped-order numbering.
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DpadRight => "R_DPAD",
            Self::DpadLeft => "L_DPAD",
            Self::DpadDown => "D_DPAD",
            Self::DpadUp => "U_DPAD",
            Self::Start => "START_BUTTON",
            Self::Z => "Z_TRIG",
            Self::B => "B_BUTTON",
            Self::A => "A_BUTTON",
            Self::CRight => "R_CBUTTON",
            Self::CLeft => "L_CBUTTON",
            Self::CDown => "D_CBUTTON",
            Self::CUp => "U_CBUTTON",
            Self::R => "R_TRIG",
            Self::L => "L_TRIG",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The sixteen 1-bit fields: fourteen buttons and two reserved flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonSet(u16);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);
    /// `Reserved1` and `Reserved2`.
    pub const RESERVED: u16 = 0xC000;

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn contains(self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, button: Button) {
        self.0 |= 1 << button.index();
    }

    #[inline]
    pub fn remove(&mut self, button: Button) {
        self.0 &= !(1 << button.index());
    }

    #[must_use]
    pub fn with(mut self, button: Button) -> Self {
        self.insert(button);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 & !Self::RESERVED == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |&b| self.contains(b))
    }
}

impl fmt::Debug for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()?;
        if self.0 & Self::RESERVED != 0 {
            write!(f, "+reserved({:#x})", self.0 >> 14)?;
        }
        Ok(())
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Decoded controller state for one slot and one polling cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub buttons: ButtonSet,
    pub stick_x: i8,
    pub stick_y: i8,
}

impl ButtonState {
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons.contains(button)
    }
}

/// Bit allocation of the packed input word.
///
/// `Swapped` is what a compiler produces for the bitfield view on a
/// little-endian host, `Forward` on a big-endian one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitOrder {
    Forward,
    Swapped,
}

/// Forward-order bit position of each [`ButtonSet`] bit.
const FORWARD_POSITIONS: [u32; 16] = [
    23, 22, 21, 20, 19, 18, 17, 16, 31, 30, 29, 28, 27, 26, 25, 24,
];

impl BitOrder {
    /// Order the host compiler gives the bitfield view.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Swapped
        } else {
            Self::Forward
        }
    }

    /// Order used by a session with the given memory representation.
    ///
    /// A swapped window keeps words host-native, so the native bit order
    /// applies; a target-order window uses the target's forward order.
    pub const fn for_session(order: MemoryOrder) -> Self {
        match order {
            MemoryOrder::Swapped => Self::native(),
            MemoryOrder::Normal => Self::Forward,
        }
    }

    /// Bit position of a [`ButtonSet`] bit (0..16) in the packed word.
    #[inline]
    pub const fn button_bit(self, index: u32) -> u32 {
        match self {
            Self::Swapped => index,
            Self::Forward => FORWARD_POSITIONS[index as usize],
        }
    }

    #[inline]
    pub const fn stick_x_shift(self) -> u32 {
        match self {
            Self::Swapped => 24,
            Self::Forward => 8,
        }
    }

    #[inline]
    pub const fn stick_y_shift(self) -> u32 {
        match self {
            Self::Swapped => 16,
            Self::Forward => 0,
        }
    }

    pub fn encode(self, state: &ButtonState) -> u32 {
        let mut value = 0u32;
        for index in 0..16 {
            if state.buttons.bits() & (1 << index) != 0 {
                value |= 1 << self.button_bit(index);
            }
        }
        value
            | (state.stick_x as u8 as u32) << self.stick_x_shift()
            | (state.stick_y as u8 as u32) << self.stick_y_shift()
    }

    pub fn decode(self, value: u32) -> ButtonState {
        let mut bits = 0u16;
        for index in 0..16 {
            if value & (1 << self.button_bit(index)) != 0 {
                bits |= 1 << index;
            }
        }
        ButtonState {
            buttons: ButtonSet::from_bits(bits),
            stick_x: (value >> self.stick_x_shift()) as u8 as i8,
            stick_y: (value >> self.stick_y_shift()) as u8 as i8,
        }
    }

    /// Memory representation of the word for this order.
    #[inline]
    fn word_to_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Swapped => value.to_le_bytes(),
            Self::Forward => value.to_be_bytes(),
        }
    }

    #[inline]
    fn word_from_bytes(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Swapped => u32::from_le_bytes(bytes),
            Self::Forward => u32::from_be_bytes(bytes),
        }
    }
}

/// The 32-bit integer view of the input-state union.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PackedButtons(pub u32);

impl fmt::Debug for PackedButtons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedButtons({:#010x})", self.0)
    }
}

impl PackedButtons {
    pub fn from_union(raw: &sys::BUTTONS) -> Self {
        // Every view of the union is plain old data.
        Self(unsafe { raw.Value })
    }

    pub fn to_union(self) -> sys::BUTTONS {
        sys::BUTTONS { Value: self.0 }
    }

    /// The two half-width views, buttons first.
    pub fn halfwords(self, order: BitOrder) -> [u16; 2] {
        let b = order.word_to_bytes(self.0);
        match order {
            BitOrder::Swapped => [
                u16::from_le_bytes([b[0], b[1]]),
                u16::from_le_bytes([b[2], b[3]]),
            ],
            BitOrder::Forward => [
                u16::from_be_bytes([b[0], b[1]]),
                u16::from_be_bytes([b[2], b[3]]),
            ],
        }
    }

    pub fn from_halfwords(halfwords: [u16; 2], order: BitOrder) -> Self {
        let [lo, hi] = match order {
            BitOrder::Swapped => [halfwords[0].to_le_bytes(), halfwords[1].to_le_bytes()],
            BitOrder::Forward => [halfwords[0].to_be_bytes(), halfwords[1].to_be_bytes()],
        };
        Self(order.word_from_bytes([lo[0], lo[1], hi[0], hi[1]]))
    }

    /// The signed byte view.
    pub fn bytes(self, order: BitOrder) -> [i8; 4] {
        order.word_to_bytes(self.0).map(|b| b as i8)
    }

    pub fn from_bytes(bytes: [i8; 4], order: BitOrder) -> Self {
        Self(order.word_from_bytes(bytes.map(|b| b as u8)))
    }

    /// Reads one button the way the bitfield view does: by locating its
    /// bit in the memory representation.
    pub fn field(self, order: BitOrder, button: Button) -> bool {
        let bytes = order.word_to_bytes(self.0);
        let bit = order.button_bit(button.index());
        let byte = match order {
            BitOrder::Swapped => bit / 8,
            BitOrder::Forward => 3 - bit / 8,
        };
        bytes[byte as usize] & (1 << (bit % 8)) != 0
    }

    /// Stick axes read through the byte view, `(x, y)`.
    pub fn stick_fields(self, order: BitOrder) -> (i8, i8) {
        let bytes = self.bytes(order);
        match order {
            BitOrder::Swapped => (bytes[3], bytes[2]),
            BitOrder::Forward => (bytes[2], bytes[3]),
        }
    }
}

fn encode_forward(state: &ButtonState) -> u32 {
    BitOrder::Forward.encode(state)
}

fn decode_forward(value: u32) -> ButtonState {
    BitOrder::Forward.decode(value)
}

fn encode_swapped(state: &ButtonState) -> u32 {
    BitOrder::Swapped.encode(state)
}

fn decode_swapped(value: u32) -> ButtonState {
    BitOrder::Swapped.decode(value)
}

/// Encode/decode pair for one bit order, chosen once per session.
#[derive(Clone, Copy)]
pub struct ButtonCodec {
    order: BitOrder,
    encode: fn(&ButtonState) -> u32,
    decode: fn(u32) -> ButtonState,
}

impl fmt::Debug for ButtonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ButtonCodec").field(&self.order).finish()
    }
}

impl PartialEq for ButtonCodec {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for ButtonCodec {}

impl ButtonCodec {
    pub const FORWARD: Self = Self {
        order: BitOrder::Forward,
        encode: encode_forward,
        decode: decode_forward,
    };

    pub const SWAPPED: Self = Self {
        order: BitOrder::Swapped,
        encode: encode_swapped,
        decode: decode_swapped,
    };

    pub const fn new(order: BitOrder) -> Self {
        match order {
            BitOrder::Forward => Self::FORWARD,
            BitOrder::Swapped => Self::SWAPPED,
        }
    }

    pub const fn for_session(order: MemoryOrder) -> Self {
        Self::new(BitOrder::for_session(order))
    }

    #[inline]
    pub fn order(&self) -> BitOrder {
        self.order
    }

    #[inline]
    pub fn encode(&self, state: &ButtonState) -> PackedButtons {
        PackedButtons((self.encode)(state))
    }

    #[inline]
    pub fn decode(&self, packed: PackedButtons) -> ButtonState {
        (self.decode)(packed.0)
    }

    pub fn read(&self, raw: &sys::BUTTONS) -> ButtonState {
        self.decode(PackedButtons::from_union(raw))
    }

    pub fn write(&self, raw: &mut sys::BUTTONS, state: &ButtonState) {
        *raw = self.encode(state).to_union();
    }
}
