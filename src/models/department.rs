use std::fmt;

/// Organisational unit (กลุ่มงาน) a record is tagged with.
///
/// The declaration order is the display order used by tables, selectors and
/// the per-department chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Department {
    Ps,
    Pp,
    Mt,
    Bs,
    Bt,
    Sp,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Ps,
        Department::Pp,
        Department::Mt,
        Department::Bs,
        Department::Bt,
        Department::Sp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Department::Ps => "พส.",
            Department::Pp => "ปป.",
            Department::Mt => "มธ.",
            Department::Bs => "บส.",
            Department::Bt => "บท.",
            Department::Sp => "สป.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
