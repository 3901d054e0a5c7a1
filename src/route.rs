use std::fmt;

/// Screens a successful action navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    RegisterAgency,
    Dashboard,
    Facilities,
    Shifts,
    Caregivers,
    Documents,
    Profile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::RegisterAgency => "/register/agency",
            Route::Dashboard => "/dashboard",
            Route::Facilities => "/dashboard/facilities",
            Route::Shifts => "/dashboard/shifts",
            Route::Caregivers => "/dashboard/caregivers",
            Route::Documents => "/dashboard/documents",
            Route::Profile => "/dashboard/profile",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
