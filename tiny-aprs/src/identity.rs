use heapless::{String, Vec};

use crate::truncated;

/// Width of the source, destination and path fields.
pub const MAX_CALL_LEN: usize = 15;
pub const MAX_PATH: usize = 8;
pub const MAX_COMMENT_LEN: usize = 64;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AprsIcon {
    X,
    Jogger,
    Bike,
    Car,
    Jeep,
    Van,
    Truck,
    Bus,
    Balloon,
    RecreationalVehicle,
    Helicopter,
    Yacht,
    Ambulance,
    FireTruck,
    Ship,
}

impl AprsIcon {
    pub const ALL: [AprsIcon; 15] = [
        AprsIcon::X,
        AprsIcon::Jogger,
        AprsIcon::Bike,
        AprsIcon::Car,
        AprsIcon::Jeep,
        AprsIcon::Van,
        AprsIcon::Truck,
        AprsIcon::Bus,
        AprsIcon::Balloon,
        AprsIcon::RecreationalVehicle,
        AprsIcon::Helicopter,
        AprsIcon::Yacht,
        AprsIcon::Ambulance,
        AprsIcon::FireTruck,
        AprsIcon::Ship,
    ];

    /// Symbol char in the primary (`/`) table.
    pub fn symbol(&self) -> char {
        match self {
            AprsIcon::X => '.',
            AprsIcon::Jogger => '[',
            AprsIcon::Bike => 'b',
            AprsIcon::Car => '>',
            AprsIcon::Jeep => 'j',
            AprsIcon::Van => 'v',
            AprsIcon::Truck => 'k',
            AprsIcon::Bus => 'U',
            AprsIcon::Balloon => 'O',
            AprsIcon::RecreationalVehicle => 'R',
            AprsIcon::Helicopter => 'X',
            AprsIcon::Yacht => 'Y',
            AprsIcon::Ambulance => 'a',
            AprsIcon::FireTruck => 'f',
            AprsIcon::Ship => 's',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AprsIcon::X => "X",
            AprsIcon::Jogger => "Jogger",
            AprsIcon::Bike => "Bike",
            AprsIcon::Car => "Car",
            AprsIcon::Jeep => "Jeep",
            AprsIcon::Van => "Van",
            AprsIcon::Truck => "Truck",
            AprsIcon::Bus => "Bus",
            AprsIcon::Balloon => "Balloon",
            AprsIcon::RecreationalVehicle => "Rec. Vehicle",
            AprsIcon::Helicopter => "Helicopter",
            AprsIcon::Yacht => "Yacht",
            AprsIcon::Ambulance => "Ambulance",
            AprsIcon::FireTruck => "Fire Truck",
            AprsIcon::Ship => "Ship",
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|icon| icon.symbol() == symbol)
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AprsFlags {
    pub add_dao: bool,
    pub add_frame_counter: bool,
    /// Not implemented, frames built with this set are refused.
    pub compress_location: bool,
}

impl Default for AprsFlags {
    fn default() -> Self {
        Self {
            add_dao: true,
            add_frame_counter: true,
            compress_location: false,
        }
    }
}

/// Who we are on air and how our frames look.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct AprsIdentity {
    pub source: String<MAX_CALL_LEN>,
    pub dest: String<MAX_CALL_LEN>,
    pub path: Vec<String<MAX_CALL_LEN>, MAX_PATH>,
    pub table: char,
    pub symbol: char,
    pub comment: String<MAX_COMMENT_LEN>,
    pub flags: AprsFlags,
}

impl Default for AprsIdentity {
    fn default() -> Self {
        Self {
            source: String::new(),
            dest: String::new(),
            path: Vec::new(),
            table: '/',
            symbol: AprsIcon::X.symbol(),
            comment: String::new(),
            flags: AprsFlags::default(),
        }
    }
}

impl AprsIdentity {
    pub fn new(source: &str, dest: &str) -> Self {
        let mut identity = Self::default();
        identity.set_source(source);
        identity.set_dest(dest);
        identity
    }

    pub fn set_source(&mut self, call: &str) {
        self.source = truncated(call);
    }

    pub fn set_dest(&mut self, call: &str) {
        self.dest = truncated(call);
    }

    /// Returns `false` once all path slots are taken.
    pub fn add_path(&mut self, call: &str) -> bool {
        self.path.push(truncated(call)).is_ok()
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    pub fn set_icon(&mut self, table: char, symbol: char) {
        self.table = table;
        self.symbol = symbol;
    }

    pub fn set_icon_default(&mut self, icon: AprsIcon) {
        self.set_icon('/', icon.symbol());
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = truncated(comment);
    }

    pub fn can_build_frame(&self) -> bool {
        !self.source.is_empty() && !self.dest.is_empty()
    }
}
