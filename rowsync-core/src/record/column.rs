//! The fixed column contract of the sheet.

/// Sheet columns, in position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Title,
    Start,
    End,
    AllDay,
    Description,
    Color,
    Guests,
    OwnerStatus,
    Location,
    SendInvites,
    Delete,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Id,
        Column::Title,
        Column::Start,
        Column::End,
        Column::AllDay,
        Column::Description,
        Column::Color,
        Column::Guests,
        Column::OwnerStatus,
        Column::Location,
        Column::SendInvites,
        Column::Delete,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Start => "start",
            Column::End => "end",
            Column::AllDay => "all_day",
            Column::Description => "description",
            Column::Color => "color",
            Column::Guests => "guests",
            Column::OwnerStatus => "my_status",
            Column::Location => "location",
            Column::SendInvites => "send_invites",
            Column::Delete => "delete",
        }
    }

    pub fn header() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }
}
