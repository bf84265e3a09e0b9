use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    TrainingRegistration,
    OfficialTravel,
    OfficialMeeting,
    Telephone,
    PaperAndInk,
    MeetingRoomRental,
    Overtime,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::TrainingRegistration,
        ExpenseCategory::OfficialTravel,
        ExpenseCategory::OfficialMeeting,
        ExpenseCategory::Telephone,
        ExpenseCategory::PaperAndInk,
        ExpenseCategory::MeetingRoomRental,
        ExpenseCategory::Overtime,
        ExpenseCategory::Other,
    ];

    /// Stored and displayed form of the category.
    pub fn code(self) -> &'static str {
        match self {
            ExpenseCategory::TrainingRegistration => "ลงทะเบียนอบรม",
            ExpenseCategory::OfficialTravel => "เดินทางไปราชการ",
            ExpenseCategory::OfficialMeeting => "ประชุมราชการ",
            ExpenseCategory::Telephone => "ค่าโทรศัพท์",
            ExpenseCategory::PaperAndInk => "ค่ากระดาษ หมึกPrinter",
            ExpenseCategory::MeetingRoomRental => "ค่าเช่าห้องประชุม",
            ExpenseCategory::Overtime => "OT",
            ExpenseCategory::Other => "อื่นๆ",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_round_trip() {
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::from_code(category.code()), Some(category));
        }
    }

    #[test]
    fn test_from_code_unknown() {
        assert_eq!(ExpenseCategory::from_code("Food"), None);
        assert_eq!(ExpenseCategory::from_code("ot"), None);
    }
}
