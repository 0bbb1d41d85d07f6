use crate::shell::Theme;

pub const PROFILE_NAME: &str = "User";
pub const PROFILE_EMAIL: &str = "user@mail.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub value: Option<&'static str>,
}

const MENU: [MenuItem; 5] = [
    MenuItem {
        label: "Saved Items",
        value: Some("12 items"),
    },
    MenuItem {
        label: "Size & Style Preferences",
        value: Some("US 8 / Minimal"),
    },
    MenuItem {
        label: "Notifications",
        value: Some("Enabled"),
    },
    MenuItem {
        label: "Account Settings",
        value: None,
    },
    MenuItem {
        label: "Customer Care",
        value: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub name: &'static str,
    pub email: &'static str,
    pub order_count: u32,
    pub status: &'static str,
    /// `ACTIVE` once a fit-check photo is uploaded.
    pub photo_status: &'static str,
    pub dark_mode: bool,
    pub menu: Vec<MenuItem>,
}

impl AccountView {
    pub fn of(has_photo: bool, theme: Theme) -> Self {
        Self {
            name: PROFILE_NAME,
            email: PROFILE_EMAIL,
            order_count: 24,
            status: "Platinum",
            photo_status: if has_photo { "ACTIVE" } else { "NOT SET" },
            dark_mode: theme == Theme::Dark,
            menu: MENU.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AccountView;
    use crate::shell::Theme;

    #[test]
    fn photo_status_and_theme_follow_shell_state() {
        let fresh = AccountView::of(false, Theme::Light);
        assert_eq!(fresh.photo_status, "NOT SET");
        assert!(!fresh.dark_mode);
        assert_eq!(fresh.menu.len(), 5);
        assert_eq!(fresh.menu[1].value, Some("US 8 / Minimal"));

        let styled = AccountView::of(true, Theme::Dark);
        assert_eq!(styled.photo_status, "ACTIVE");
        assert!(styled.dark_mode);
        assert_eq!(styled.status, "Platinum");
    }
}
