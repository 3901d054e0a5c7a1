use anyhow::{anyhow, Context as _, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use omni_agency::agency::{self, ProfileForm};
use omni_agency::api::{ApiClient, FacilityService, FilePart, ShiftService};
use omni_agency::auth;
use omni_agency::caregivers::{self, CaregiverBoard, CaregiverTab};
use omni_agency::document_types::{DocumentTypeForm, DocumentTypeList};
use omni_agency::facilities::{self, FacilityForm, FacilityList};
use omni_agency::forms;
use omni_agency::model::{
    AgencyInfo, GeoPoint, NursePayRate, NurseType, PersonalInfo, ProviderCategory, Shift,
    ShiftStatus,
};
use omni_agency::render;
use omni_agency::route::Route;
use omni_agency::session::{GuardOutcome, Session, SessionGuard, SessionStore};
use omni_agency::shifts::{filter_by_status, ShiftBoard, ShiftDetails, ShiftDraft, ShiftEditForm, ShiftTab};

pub struct Context {
    pub api: ApiClient,
    pub store: SessionStore,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as an agency admin
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Two-step agency registration
    #[command(subcommand)]
    Register(RegisterCmd),
    /// Dashboard counters and recent applicants
    Overview,
    #[command(subcommand)]
    Facilities(FacilityCmd),
    #[command(subcommand)]
    Shifts(ShiftCmd),
    #[command(subcommand)]
    Caregivers(CaregiverCmd),
    #[command(subcommand)]
    DocumentTypes(DocumentTypeCmd),
    #[command(subcommand)]
    Profile(ProfileCmd),
}

#[derive(Debug, Subcommand)]
pub enum RegisterCmd {
    /// Step one: the admin's own details
    Personal {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
    },
    /// Step two: the agency's details
    Agency {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum FacilityCmd {
    List,
    Show { id: String },
    Create {
        #[command(flatten)]
        fields: FacilityFields,
        /// Picture of the facility
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: FacilityFields,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct FacilityFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,
    /// Street address
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    floor: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl FacilityFields {
    fn apply(self, form: &mut FacilityForm) {
        let FacilityFields {
            name,
            latitude,
            longitude,
            address,
            phone,
            email,
            building,
            floor,
            description,
        } = self;
        if let Some(v) = name {
            form.name = v;
        }
        if latitude.is_some() || longitude.is_some() {
            form.location = GeoPoint::new(
                latitude.unwrap_or(form.location.latitude),
                longitude.unwrap_or(form.location.longitude),
            );
        }
        if let Some(v) = address {
            form.text_location = v;
        }
        if let Some(v) = phone {
            form.telephone = v;
        }
        if let Some(v) = email {
            form.email = v;
        }
        if let Some(v) = building {
            form.building_name = v;
        }
        if let Some(v) = floor {
            form.floor = v;
        }
        if let Some(v) = description {
            form.description = v;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ShiftCmd {
    List {
        /// open-shifts, active-shifts or canceled-shifts; anything else shows all
        #[arg(long, default_value = "all-shifts")]
        tab: String,
    },
    Show { id: String },
    Create {
        #[command(flatten)]
        fields: ShiftFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: ShiftFields,
        #[arg(long)]
        status: Option<ShiftStatus>,
    },
    Delete { id: String },
    /// Shifts of a single facility
    ByFacility { facility_id: String },
}

#[derive(Debug, Args)]
pub struct ShiftFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    facility: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM, local time
    #[arg(long)]
    start: Option<String>,
    /// HH:MM, local time
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    base_price: Option<f64>,
    #[arg(long)]
    needed: Option<u32>,
    /// Required role, repeatable (RN, CNA, LPN, HHA)
    #[arg(long = "role")]
    roles: Vec<NurseType>,
    /// Pay rate as ROLE=RATE, repeatable
    #[arg(long = "rate", value_parser = parse_rate)]
    rates: Vec<NursePayRate>,
}

fn parse_rate(raw: &str) -> Result<NursePayRate, String> {
    let (role, rate) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROLE=RATE, got '{}'", raw))?;
    let nurse_type = role.parse::<NurseType>()?;
    let pay_rate = rate
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid rate '{}'", rate))?;
    Ok(NursePayRate {
        nurse_type,
        pay_rate,
    })
}

#[derive(Debug, Subcommand)]
pub enum CaregiverCmd {
    List {
        /// verify-documents or verified-caregivers
        #[arg(long, default_value = "verify-documents")]
        tab: String,
    },
    Show { id: String },
    Notify {
        id: String,
        #[arg(long)]
        message: String,
    },
    /// Uploaded documents awaiting review
    Documents { id: String },
    Verify {
        id: String,
        /// Document type id; defaults to the first document
        #[arg(long)]
        document: Option<String>,
        /// Approve; without it the document is rejected
        #[arg(long)]
        approve: bool,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DocumentTypeCmd {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        applies: AppliesTo,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        applies: AppliesTo,
    },
}

#[derive(Debug, Args)]
pub struct AppliesTo {
    /// nurse, cna or home_healthcare; repeatable
    #[arg(long = "applies-to")]
    categories: Vec<ProviderCategory>,
    #[arg(long, conflicts_with = "categories")]
    all: bool,
}

impl AppliesTo {
    fn apply(&self, form: &mut DocumentTypeForm) {
        if self.all {
            form.set_applies_to_all(true);
        } else if !self.categories.is_empty() {
            form.select(&self.categories);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ProfileCmd {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    Logo {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let (_, route) = auth::login(&ctx.api, &ctx.store, &email, &password).await?;
            navigate("Logged in", route);
        }
        Command::Logout => {
            let route = auth::logout(&ctx.store).await?;
            navigate("Logged out", route);
        }
        Command::Register(cmd) => register(ctx, cmd).await?,
        Command::Overview => {
            let session = guarded(ctx).await?;
            let overview = agency::load_overview(&ctx.api, &session).await?;
            print!("{}", render::overview(&overview));
        }
        Command::Facilities(cmd) => {
            let session = guarded(ctx).await?;
            facilities_cmd(ctx, session, cmd).await?;
        }
        Command::Shifts(cmd) => {
            let session = guarded(ctx).await?;
            shifts_cmd(ctx, session, cmd).await?;
        }
        Command::Caregivers(cmd) => {
            let session = guarded(ctx).await?;
            caregivers_cmd(ctx, session, cmd).await?;
        }
        Command::DocumentTypes(cmd) => {
            let session = guarded(ctx).await?;
            document_types_cmd(ctx, session, cmd).await?;
        }
        Command::Profile(cmd) => {
            let session = guarded(ctx).await?;
            profile_cmd(ctx, session, cmd).await?;
        }
    }
    Ok(())
}

fn navigate(message: &str, route: Route) {
    info!(%route, "navigate");
    println!("{}", render::success(message));
}

async fn guarded(ctx: &Context) -> Result<Session> {
    let mut guard = SessionGuard::new();
    match guard.check(&ctx.store).await? {
        GuardOutcome::Render(session) => Ok(session),
        GuardOutcome::Redirect(route) => Err(anyhow!(
            "not logged in; run `omni-agency login` (redirect to {})",
            route
        )),
    }
}

async fn register(ctx: &Context, cmd: RegisterCmd) -> Result<()> {
    match cmd {
        RegisterCmd::Personal {
            name,
            email,
            phone,
            password,
        } => {
            let info = PersonalInfo {
                name,
                email,
                phone,
                password,
            };
            let route = auth::register_personal(&ctx.store, &info).await?;
            navigate("Saved. Continue with `register agency`", route);
        }
        RegisterCmd::Agency {
            name,
            email,
            phone,
            address,
        } => {
            let info = AgencyInfo {
                agency_name: name,
                agency_email: email,
                agency_phone: phone,
                agency_address: address,
            };
            let route = auth::register_agency(&ctx.api, &ctx.store, &info).await?;
            navigate("Agency registered. You can log in now", route);
        }
    }
    Ok(())
}

async fn facilities_cmd(ctx: &Context, session: Session, cmd: FacilityCmd) -> Result<()> {
    match cmd {
        FacilityCmd::List => {
            let list = FacilityList::load(&ctx.api, session).await?;
            print!("{}", render::facilities(list.facilities()));
        }
        FacilityCmd::Show { id } => {
            let facility = ctx.api.fetch_facility(&session, &id).await?;
            print!("{}", render::facility(&facility));
        }
        FacilityCmd::Create { fields, image } => {
            let mut form = FacilityForm::default();
            fields.apply(&mut form);
            let image = read_file(image).await?;
            let route = facilities::create_facility(&ctx.api, &session, &form, image).await?;
            navigate("Facility created", route);
        }
        FacilityCmd::Update { id, fields, image } => {
            let current = ctx
                .api
                .fetch_facility(&session, &id)
                .await
                .context("failed to load facility")?;
            let mut form = FacilityForm::from_facility(&current);
            fields.apply(&mut form);
            let image = read_file(image).await?;
            let route = facilities::update_facility(&ctx.api, &session, &id, &form, image).await?;
            navigate("Facility updated", route);
        }
        FacilityCmd::Delete { id } => {
            let mut list = FacilityList::load(&ctx.api, session).await?;
            list.delete(&id).await?;
            println!("{}", render::success("Facility deleted"));
            print!("{}", render::facilities(list.facilities()));
        }
    }
    Ok(())
}

async fn read_file(path: Option<PathBuf>) -> Result<Option<FilePart>> {
    match path {
        Some(path) => Ok(Some(
            FilePart::from_path(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
        )),
        None => Ok(None),
    }
}

fn draft_from(fields: ShiftFields) -> Result<ShiftDraft> {
    Ok(ShiftDraft {
        title: fields.title.unwrap_or_default(),
        facility_id: fields.facility,
        date: fields.date.as_deref().map(forms::parse_date).transpose()?,
        start_time: fields
            .start
            .as_deref()
            .map(|v| forms::parse_time("startTime", v))
            .transpose()?,
        end_time: fields
            .end
            .as_deref()
            .map(|v| forms::parse_time("endTime", v))
            .transpose()?,
        base_price: fields.base_price.unwrap_or_default(),
        caregivers_needed: fields.needed.unwrap_or(1),
        nurse_types: fields.roles,
        pay_rates: fields.rates,
        status: None,
    })
}

fn edit_from(shift: &Shift, fields: ShiftFields, status: Option<ShiftStatus>) -> Result<ShiftEditForm> {
    let mut form = ShiftEditForm::from_shift(shift);
    if let Some(v) = fields.title {
        form.title = v;
    }
    if let Some(v) = fields.facility {
        form.facility_id = Some(v);
    }
    if let Some(v) = fields.date.as_deref() {
        form.date = Some(forms::parse_date(v)?);
    }
    if fields.start.is_some() || fields.end.is_some() {
        form.ends_next_day = false;
    }
    if let Some(v) = fields.start.as_deref() {
        form.start_time = Some(forms::parse_time("startTime", v)?);
    }
    if let Some(v) = fields.end.as_deref() {
        form.end_time = Some(forms::parse_time("endTime", v)?);
    }
    if let Some(v) = fields.base_price {
        form.base_price = v;
    }
    if let Some(v) = fields.needed {
        form.caregivers_needed = v;
    }
    if !fields.roles.is_empty() {
        form.nurse_types = fields.roles;
    }
    if !fields.rates.is_empty() {
        form.pay_rates = fields.rates;
    }
    if let Some(v) = status {
        form.status = v;
    }
    Ok(form)
}

async fn shifts_cmd(ctx: &Context, session: Session, cmd: ShiftCmd) -> Result<()> {
    match cmd {
        ShiftCmd::List { tab } => {
            let mut board = ShiftBoard::load(&ctx.api, session).await?;
            board.set_tab(ShiftTab::from_id(&tab));
            print!("{}", render::shifts(&board.visible()));
        }
        ShiftCmd::Show { id } => {
            let shift = ctx.api.fetch_shift(&session, &id).await?;
            print!("{}", render::shift_details(&ShiftDetails::of(&shift)));
        }
        ShiftCmd::Create { fields } => {
            let draft = draft_from(fields)?;
            let mut board = ShiftBoard::load(&ctx.api, session).await?;
            let created = board.create(&draft).await?;
            println!("{}", render::success(&format!("Shift {} created", created.id)));
            print!("{}", render::shifts(&board.visible()));
        }
        ShiftCmd::Update { id, fields, status } => {
            let mut board = ShiftBoard::load(&ctx.api, session.clone()).await?;
            let current = match board.find(&id) {
                Some(shift) => shift.clone(),
                None => ctx.api.fetch_shift(&session, &id).await?,
            };
            let form = edit_from(&current, fields, status)?;
            board.update(&id, &form).await?;
            println!("{}", render::success("Shift updated"));
            print!("{}", render::shifts(&board.visible()));
        }
        ShiftCmd::Delete { id } => {
            let mut board = ShiftBoard::load(&ctx.api, session).await?;
            board.delete(&id).await?;
            println!("{}", render::success("Shift deleted"));
            print!("{}", render::shifts(&board.visible()));
        }
        ShiftCmd::ByFacility { facility_id } => {
            let shifts = ctx.api.fetch_shifts_by_facility(&session, &facility_id).await?;
            print!("{}", render::shifts(&filter_by_status(&shifts, ShiftTab::All)));
        }
    }
    Ok(())
}

async fn caregivers_cmd(ctx: &Context, session: Session, cmd: CaregiverCmd) -> Result<()> {
    match cmd {
        CaregiverCmd::List { tab } => {
            let tab = CaregiverTab::from_id(&tab)
                .ok_or_else(|| anyhow!("unknown tab '{}'", tab))?;
            let mut board = CaregiverBoard::load(&ctx.api, session).await?;
            board.set_tab(tab);
            print!("{}", render::caregivers(&board.visible(), tab));
        }
        CaregiverCmd::Show { id } => {
            let details = caregivers::caregiver_details(&ctx.api, &session, &id).await?;
            print!("{}", render::caregiver_details(&details));
        }
        CaregiverCmd::Notify { id, message } => {
            caregivers::notify(&ctx.api, &session, &id, &message).await?;
            println!("{}", render::success("Notification sent"));
        }
        CaregiverCmd::Documents { id } => {
            let board = CaregiverBoard::load(&ctx.api, session).await?;
            let dialog = board.review(&id, None)?;
            print!("{}", render::verification(&dialog));
        }
        CaregiverCmd::Verify {
            id,
            document,
            approve,
            comment,
        } => {
            let mut board = CaregiverBoard::load(&ctx.api, session).await?;
            let mut dialog = board.review(&id, document.as_deref())?;
            let status = board.verify(&mut dialog, approve, comment.as_deref()).await?;
            println!("{}", render::success(&format!("Document {}", status)));
            print!("{}", render::verification(&dialog));
        }
    }
    Ok(())
}

async fn document_types_cmd(ctx: &Context, session: Session, cmd: DocumentTypeCmd) -> Result<()> {
    let mut list = DocumentTypeList::load(&ctx.api, session).await?;
    match cmd {
        DocumentTypeCmd::List => {}
        DocumentTypeCmd::Create { name, applies } => {
            let mut form = DocumentTypeForm::new(name);
            applies.apply(&mut form);
            let created = list.create(&form).await?;
            println!("{}", render::success(&format!("Document type '{}' created", created.name)));
        }
        DocumentTypeCmd::Update { id, name, applies } => {
            let current = list
                .find(&id)
                .ok_or_else(|| anyhow!("unknown document type '{}'", id))?;
            let mut form = DocumentTypeForm::from_document(current);
            if let Some(name) = name {
                form.name = name;
            }
            applies.apply(&mut form);
            list.update(&id, &form).await?;
            println!("{}", render::success("Document type updated"));
        }
    }
    print!("{}", render::document_types(list.documents()));
    Ok(())
}

async fn profile_cmd(ctx: &Context, session: Session, cmd: ProfileCmd) -> Result<()> {
    match cmd {
        ProfileCmd::Show => {
            let profile = agency::fetch_profile(&ctx.api, &session).await?;
            print!("{}", render::profile(&profile));
        }
        ProfileCmd::Update {
            name,
            email,
            phone,
            address,
        } => {
            let current = agency::fetch_profile(&ctx.api, &session).await?;
            let mut form = ProfileForm::from_profile(&current);
            if let Some(v) = name {
                form.name = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = phone {
                form.phone = v;
            }
            if let Some(v) = address {
                form.address = v;
            }
            let updated = agency::update_profile(&ctx.api, &session, &form).await?;
            println!("{}", render::success("Profile updated"));
            print!("{}", render::profile(&updated));
        }
        ProfileCmd::Logo { file } => {
            let url = agency::update_logo(&ctx.api, &session, file.as_deref()).await?;
            println!("{}", render::success(&format!("Logo updated: {}", url)));
        }
    }
    Ok(())
}
