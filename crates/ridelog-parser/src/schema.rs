/// Columns of a ride-history export, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripColumn {
    StartDate,
    EndDate,
    Category,
    Start,
    Stop,
    Miles,
    Purpose,
}

impl TripColumn {
    pub const ALL: [TripColumn; 7] = [
        TripColumn::StartDate,
        TripColumn::EndDate,
        TripColumn::Category,
        TripColumn::Start,
        TripColumn::Stop,
        TripColumn::Miles,
        TripColumn::Purpose,
    ];

    /// Header text as it appears in the raw export.
    pub fn raw_name(&self) -> &'static str {
        match self {
            TripColumn::StartDate => "START_DATE*",
            TripColumn::EndDate => "END_DATE*",
            TripColumn::Category => "CATEGORY*",
            TripColumn::Start => "START*",
            TripColumn::Stop => "STOP*",
            TripColumn::Miles => "MILES*",
            TripColumn::Purpose => "PURPOSE*",
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            TripColumn::StartDate => "Start Date",
            TripColumn::EndDate => "End Date",
            TripColumn::Category => "Category",
            TripColumn::Start => "Start",
            TripColumn::Stop => "Stop",
            TripColumn::Miles => "Miles",
            TripColumn::Purpose => "Purpose",
        }
    }
}

pub const RAW_COLUMNS: [&str; 7] = [
    "START_DATE*",
    "END_DATE*",
    "CATEGORY*",
    "START*",
    "STOP*",
    "MILES*",
    "PURPOSE*",
];

pub const CANONICAL_COLUMNS: [&str; 7] = [
    "Start Date",
    "End Date",
    "Category",
    "Start",
    "Stop",
    "Miles",
    "Purpose",
];
